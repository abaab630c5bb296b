//! # Data Exchange Scenarios
//!
//! Round-trips of every payload kind between two connected solvers.

#[cfg(test)]
mod tests {
    use super::super::*;
    use cosim_io::{CoSimError, ElementType, MeshData, ModelPart, Vector};
    use rand::Rng;

    async fn connected() -> (CoSimIo, CoSimIo, String) {
        let (a, b) = solver_pair(in_memory_config());
        let name = connect_pair(&a, "exporter", &b, "importer").await;
        (a, b, name)
    }

    fn random_model_part(name: &str, nodes: usize) -> ModelPart {
        let mut rng = rand::thread_rng();
        let mut model_part = ModelPart::new(name).unwrap();
        for id in 1..=nodes as i64 {
            let (x, y, z) = (rng.gen_range(-1e3..1e3), rng.gen(), rng.gen::<f64>() * 1e-9);
            if rng.gen_bool(0.2) {
                model_part
                    .create_new_ghost_node(id, x, y, z, rng.gen_range(0..8))
                    .unwrap();
            } else {
                model_part.create_new_node(id, x, y, z).unwrap();
            }
        }
        for id in 1..nodes as i64 - 1 {
            model_part
                .create_new_element(id, ElementType::Triangle3D3, &[id, id + 1, id + 2])
                .unwrap();
        }
        model_part
    }

    #[tokio::test]
    async fn test_info_round_trip_with_nested_settings() {
        let (a, b, name) = connected().await;
        let nested = Info::new().with("tolerance", 1e-8).with("max_iterations", 25);
        let info = on(&name, "solver_settings")
            .with("time_step", 0.01)
            .with("restart", false)
            .with("solver", "gmres")
            .with("linear", nested.clone());

        let sent = info.clone();
        let exporter = tokio::spawn(async move { a.export_info(&sent).await });
        let imported = within_deadline(b.import_info(&on(&name, "solver_settings")))
            .await
            .unwrap();
        exporter.await.unwrap().unwrap();

        assert_eq!(imported, info);
        assert_eq!(imported.get_info("linear").unwrap(), nested);
    }

    #[tokio::test]
    async fn test_random_vectors_round_trip_bit_identical() {
        let (a, b, name) = connected().await;
        let mut rng = rand::thread_rng();

        let batches: Vec<Vec<f64>> = (0..20)
            .map(|_| {
                let len = rng.gen_range(0..5000);
                (0..len).map(|_| rng.gen::<f64>() * 1e6 - 5e5).collect()
            })
            .collect();

        let sent = batches.clone();
        let exporter_name = name.clone();
        let exporter = tokio::spawn(async move {
            for (step, values) in sent.iter().enumerate() {
                a.export_data(&on(&exporter_name, &format!("field_{step}")), values)
                    .await?;
            }
            Ok::<_, CoSimError>(())
        });

        let mut received = Vector::zeros(7);
        for (step, expected) in batches.iter().enumerate() {
            let result = within_deadline(
                b.import_data(&on(&name, &format!("field_{step}")), &mut received),
            )
            .await
            .unwrap();
            assert_eq!(result.get_int("size").unwrap(), expected.len() as i64);
            assert_eq!(received.len(), expected.len());
            for (got, want) in received.iter().zip(expected) {
                assert_eq!(got.to_bits(), want.to_bits());
            }
        }
        exporter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_random_model_parts_round_trip() {
        let (a, b, name) = connected().await;

        for round in 0..5 {
            let source = random_model_part("interface", 50 + round * 40);
            let sent = source.clone();
            let sender = a.clone();
            let exporter_name = name.clone();
            let exporter = tokio::spawn(async move {
                sender.export_mesh(&on(&exporter_name, "interface_mesh"), &sent).await
            });

            let mut target = ModelPart::new("received").unwrap();
            within_deadline(b.import_mesh(&on(&name, "interface_mesh"), &mut target))
                .await
                .unwrap();
            exporter.await.unwrap().unwrap();

            assert_eq!(target.number_of_nodes(), source.number_of_nodes());
            assert_eq!(target.number_of_ghost_nodes(), source.number_of_ghost_nodes());
            assert_eq!(target.number_of_elements(), source.number_of_elements());
            for node in source.nodes() {
                let copy = target.get_node(node.id()).unwrap();
                assert_eq!(copy.coordinates(), node.coordinates());
                assert_eq!(target.ghost_partition(node.id()), source.ghost_partition(node.id()));
            }
            for element in source.elements() {
                let copy = target.get_element(element.id()).unwrap();
                assert_eq!(copy.element_type(), element.element_type());
                assert!(copy.node_ids().eq(element.node_ids()));
            }
        }
    }

    #[tokio::test]
    async fn test_mesh_import_conflict_leaves_target_unchanged() {
        let (a, b, name) = connected().await;

        let mut source = ModelPart::new("interface").unwrap();
        source.create_new_node(10, 0.0, 0.0, 0.0).unwrap();
        source.create_new_node(11, 1.0, 0.0, 0.0).unwrap();
        source
            .create_new_element(1, ElementType::Line3D2, &[10, 11])
            .unwrap();

        let mut target = ModelPart::new("received").unwrap();
        target.create_new_node(11, 7.0, 7.0, 7.0).unwrap();
        let before = target.clone();

        let exporter_name = name.clone();
        let exporter = tokio::spawn(async move {
            a.export_mesh(&on(&exporter_name, "mesh"), &source).await
        });
        let imported = within_deadline(b.import_mesh(&on(&name, "mesh"), &mut target)).await;
        let exported = exporter.await.unwrap();

        assert!(matches!(imported, Err(CoSimError::DuplicateId { id: 11, .. })));
        assert!(exported.unwrap_err().is_rendezvous_failure());
        assert_eq!(target, before);
    }

    #[tokio::test]
    async fn test_mesh_data_round_trip() {
        let (a, b, name) = connected().await;
        let source = MeshData::from_model_part(&random_model_part("raw", 30));

        let sent = source.clone();
        let exporter_name = name.clone();
        let exporter = tokio::spawn(async move {
            a.export_mesh_data(&on(&exporter_name, "raw_mesh"), &sent).await
        });

        let mut received = MeshData::default();
        let result = within_deadline(b.import_mesh_data(&on(&name, "raw_mesh"), &mut received))
            .await
            .unwrap();
        exporter.await.unwrap().unwrap();

        assert_eq!(received, source);
        assert_eq!(result.get_int("number_of_nodes").unwrap(), 30);
        assert_eq!(result.get_int("number_of_elements").unwrap(), 28);
    }

    #[tokio::test]
    async fn test_mismatched_identifier_fails_both_sides() {
        let (a, b, name) = connected().await;

        let exporter_name = name.clone();
        let exporter = tokio::spawn(async move {
            a.export_data(&on(&exporter_name, "pressure"), &[1.0, 2.0]).await
        });
        let mut values = Vector::from(vec![9.0]);
        let imported = within_deadline(b.import_data(&on(&name, "velocity"), &mut values)).await;

        assert!(imported.unwrap_err().is_rendezvous_failure());
        assert!(exporter.await.unwrap().unwrap_err().is_rendezvous_failure());
        assert_eq!(values.as_slice(), &[9.0]);
    }

    #[tokio::test]
    async fn test_rendezvous_timeout_from_settings() {
        let (a, b) = solver_pair(in_memory_config());
        let (ra, rb) = within_deadline(async {
            let a_settings = peer_settings("a", "b").with("rendezvous_timeout", 0.1);
            let b_settings = peer_settings("b", "a");
            tokio::join!(a.connect(&a_settings), b.connect(&b_settings))
        })
        .await;
        ra.unwrap();
        rb.unwrap();

        // "b" never imports
        let err = within_deadline(a.export_data(&on("a_b", "unmatched"), &[1.0]))
            .await
            .unwrap_err();
        assert!(err.is_rendezvous_failure());
    }

    #[tokio::test]
    async fn test_exchange_after_disconnect_is_rejected() {
        let (a, b, name) = connected().await;
        disconnect_pair(&a, &b, &name).await;

        assert!(matches!(
            a.export_data(&on(&name, "late"), &[1.0]).await,
            Err(CoSimError::NotConnected { .. })
        ));
        let mut values = Vector::new();
        assert!(matches!(
            b.import_data(&on(&name, "late"), &mut values).await,
            Err(CoSimError::NotConnected { .. })
        ));
    }
}

//! # Socket Transport Scenarios
//!
//! The in-memory flows repeated over loopback TCP. Each test uses its own
//! temporary working directory for the port files.

#[cfg(test)]
mod tests {
    use super::super::*;
    use cosim_bus::socket::port_file_path;
    use cosim_io::{CoSimError, ConnectionStatus, ElementType, ModelPart, Result, Vector};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn socket_pair(dir: &tempfile::TempDir) -> (CoSimIo, CoSimIo) {
        solver_pair(socket_config(dir.path()))
    }

    #[tokio::test]
    async fn test_socket_connect_exchange_disconnect() {
        let dir = tempfile::tempdir().unwrap();
        let (fluid, structure) = socket_pair(&dir);

        let name = connect_pair(&fluid, "fluid", &structure, "structure").await;
        assert_eq!(fluid.connection_status(&name), ConnectionStatus::Connected);
        // the port file is only needed until the secondary has connected
        assert!(!port_file_path(dir.path(), &name).exists());

        let values: Vec<f64> = (0..10_000).map(|i| f64::from(i).sqrt()).collect();
        let sent = values.clone();
        let sender = fluid.clone();
        let exporter_name = name.clone();
        let exporter = tokio::spawn(async move {
            sender.export_data(&on(&exporter_name, "displacement"), &sent).await
        });

        let mut received = Vector::new();
        within_deadline(structure.import_data(&on(&name, "displacement"), &mut received))
            .await
            .unwrap();
        exporter.await.unwrap().unwrap();
        assert_eq!(received.as_slice(), values.as_slice());

        disconnect_pair(&fluid, &structure, &name).await;
    }

    #[tokio::test]
    async fn test_socket_mesh_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = socket_pair(&dir);
        let name = connect_pair(&a, "a", &b, "b").await;

        let mut source = ModelPart::new("interface").unwrap();
        source.create_new_node(691, 1.0, -2.7, 9.44).unwrap();
        source.create_new_ghost_node(692, 0.0, 0.0, 0.0, 18).unwrap();
        source.create_new_node(693, 3.0, 0.0, 0.0).unwrap();
        source
            .create_new_element(1, ElementType::Triangle3D3, &[691, 692, 693])
            .unwrap();

        let sent = source.clone();
        let sender = a.clone();
        let exporter_name = name.clone();
        let exporter = tokio::spawn(async move {
            sender.export_mesh(&on(&exporter_name, "interface"), &sent).await
        });

        let mut target = ModelPart::new("target").unwrap();
        within_deadline(b.import_mesh(&on(&name, "interface"), &mut target))
            .await
            .unwrap();
        exporter.await.unwrap().unwrap();

        assert_eq!(target.number_of_nodes(), 3);
        assert_eq!(target.number_of_local_nodes(), 2);
        assert_eq!(target.ghost_partition(692), Some(18));
        assert_eq!(target.get_node(691).unwrap().coordinates(), [1.0, -2.7, 9.44]);

        disconnect_pair(&a, &b, &name).await;
    }

    #[tokio::test]
    async fn test_socket_run_loop() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, controlled) = socket_pair(&dir);
        let name = connect_pair(&controller, "controller", &controlled, "solver").await;

        let steps = Arc::new(AtomicUsize::new(0));
        let counter = steps.clone();
        controlled
            .register(
                &Info::new()
                    .with("connection_name", name.as_str())
                    .with("function_name", "advance"),
                Arc::new(move |_: Info| -> Result<Info> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Info::new())
                }),
            )
            .unwrap();

        let runner_io = controlled.clone();
        let run_settings = Info::new().with("connection_name", name.as_str());
        let runner = tokio::spawn(async move { runner_io.run(&run_settings).await });

        let signal = |control_signal: &str| {
            Info::new()
                .with("connection_name", name.as_str())
                .with("control_signal", control_signal)
        };
        within_deadline(async {
            for _ in 0..25 {
                controller.send_control_signal(&signal("advance")).await.unwrap();
            }
            controller.send_control_signal(&signal("exit")).await.unwrap();
        })
        .await;

        within_deadline(runner).await.unwrap().unwrap();
        assert_eq!(steps.load(Ordering::SeqCst), 25);

        disconnect_pair(&controller, &controlled, &name).await;
    }

    #[tokio::test]
    async fn test_socket_reconnect_reuses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = socket_pair(&dir);

        for _ in 0..3 {
            let name = connect_pair(&a, "a", &b, "b").await;
            disconnect_pair(&a, &b, &name).await;
        }
        assert!(a.active_connections().is_empty());
    }

    #[tokio::test]
    async fn test_socket_secondary_without_primary_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig {
            connect_timeout: std::time::Duration::from_millis(200),
            ..socket_config(dir.path())
        };
        let (_, secondary) = solver_pair(config);

        // "z" > "a", so "z" waits for a port file that never appears
        let err = within_deadline(secondary.connect(&peer_settings("z", "a")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoSimError::Transport(_)));
        assert_eq!(secondary.connection_status("a_z"), ConnectionStatus::NotConnected);
    }
}

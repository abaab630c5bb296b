//! # Connection Scenarios
//!
//! Lifecycle of connections between independent `CoSimIo` instances.

#[cfg(test)]
mod tests {
    use super::super::*;
    use cosim_io::{CoSimError, ConnectionStatus};

    #[tokio::test]
    async fn test_connect_reports_shared_name_and_roles() {
        let (fluid, structure) = solver_pair(in_memory_config());

        let (rf, rs) = within_deadline(async {
            let fluid_settings = peer_settings("fluid", "structure");
            let structure_settings = peer_settings("structure", "fluid");
            tokio::join!(
                fluid.connect(&fluid_settings),
                structure.connect(&structure_settings),
            )
        })
        .await;
        let (rf, rs) = (rf.unwrap(), rs.unwrap());

        for result in [&rf, &rs] {
            assert_eq!(result.get_string("connection_name").unwrap(), "fluid_structure");
            assert_eq!(
                result.get_int("connection_status").unwrap(),
                ConnectionStatus::Connected.as_int()
            );
            assert!(result.get_double("elapsed_time").unwrap() >= 0.0);
        }
        assert!(rf.get_bool("is_primary_connection").unwrap());
        assert!(!rs.get_bool("is_primary_connection").unwrap());
        assert_eq!(rf.get_string("partner_version").unwrap(), cosim_io::version_string());

        disconnect_pair(&fluid, &structure, "fluid_structure").await;
        assert_eq!(
            fluid.connection_status("fluid_structure"),
            ConnectionStatus::NotConnected
        );
    }

    #[tokio::test]
    async fn test_concurrent_connect_same_name_conflicts_then_reconnects() {
        let (a, b) = solver_pair(in_memory_config());

        // two connect attempts of "a" race for the name; exactly one pairs with "b"
        let (first, second, partner) = within_deadline(async {
            let a_settings_1 = peer_settings("a", "b");
            let a_settings_2 = peer_settings("a", "b");
            let b_settings = peer_settings("b", "a");
            tokio::join!(
                a.connect(&a_settings_1),
                a.connect(&a_settings_2),
                b.connect(&b_settings),
            )
        })
        .await;
        partner.unwrap();
        let outcomes = [first, second];
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(CoSimError::ConnectionConflict { .. })))
            .count();
        assert_eq!(conflicts, 1);
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);

        disconnect_pair(&a, &b, "a_b").await;

        // the name is free again
        let name = connect_pair(&a, "a", &b, "b").await;
        assert_eq!(name, "a_b");
        assert_eq!(a.connection_status("a_b"), ConnectionStatus::Connected);
        disconnect_pair(&a, &b, "a_b").await;
    }

    #[tokio::test]
    async fn test_disconnect_unknown_connection_is_reported() {
        let (a, _) = solver_pair(in_memory_config());
        let result = a
            .disconnect(&Info::new().with("connection_name", "never_connected"))
            .await
            .unwrap();

        assert_eq!(
            result.get_int("connection_status").unwrap(),
            ConnectionStatus::DisconnectionError.as_int()
        );
        assert!(!result.get_bool("is_connected").unwrap());
        assert!(!result.get_string("error").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_solver_with_two_partners() {
        let hub = cosim_bus::InMemoryHub::new();
        let config = in_memory_config();
        let fluid = CoSimIo::with_hub(config.clone(), hub.clone());
        let structure = CoSimIo::with_hub(config.clone(), hub.clone());
        let thermal = CoSimIo::with_hub(config, hub);

        let fs = connect_pair(&fluid, "fluid", &structure, "structure").await;
        let ft = connect_pair(&fluid, "fluid", &thermal, "thermal").await;
        assert_eq!(fluid.active_connections(), vec![fs.clone(), ft.clone()]);

        // exchanges on one connection do not interfere with the other
        let sender = fluid.clone();
        let (fs_name, ft_name) = (fs.clone(), ft.clone());
        let exporter = tokio::spawn(async move {
            sender.export_data(&on(&ft_name, "heat_flux"), &[2.0]).await?;
            sender.export_data(&on(&fs_name, "pressure"), &[1.0]).await
        });

        let mut pressure = cosim_io::Vector::new();
        let mut heat_flux = cosim_io::Vector::new();
        within_deadline(async {
            thermal.import_data(&on(&ft, "heat_flux"), &mut heat_flux).await.unwrap();
            structure.import_data(&on(&fs, "pressure"), &mut pressure).await.unwrap();
        })
        .await;
        exporter.await.unwrap().unwrap();

        assert_eq!(pressure.as_slice(), &[1.0]);
        assert_eq!(heat_flux.as_slice(), &[2.0]);

        disconnect_pair(&fluid, &structure, &fs).await;
        disconnect_pair(&fluid, &thermal, &ft).await;
        assert!(fluid.active_connections().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_connection_name_and_primary() {
        let (a, b) = solver_pair(in_memory_config());
        let settings = |primary: bool| {
            Info::new()
                .with("connection_name", "coupling")
                .with("is_primary_connection", primary)
                .with("echo_level", 1)
        };

        let (ra, rb) = within_deadline(async {
            let a_settings = settings(true);
            let b_settings = settings(false);
            tokio::join!(a.connect(&a_settings), b.connect(&b_settings))
        })
        .await;
        assert!(ra.unwrap().get_bool("is_primary_connection").unwrap());
        assert!(!rb.unwrap().get_bool("is_primary_connection").unwrap());

        disconnect_pair(&a, &b, "coupling").await;
    }

    #[tokio::test]
    async fn test_invalid_names_are_rejected_before_connecting() {
        let (a, _) = solver_pair(in_memory_config());

        for settings in [
            Info::new(),
            peer_settings("a", "a"),
            peer_settings("a.b", "c"),
            peer_settings("", "c"),
            Info::new().with("connection_name", "with space"),
        ] {
            assert!(matches!(
                a.connect(&settings).await,
                Err(CoSimError::InvalidName { .. })
            ));
        }
        assert!(a.active_connections().is_empty());
    }

    #[tokio::test]
    async fn test_connect_without_partner_times_out() {
        let config = RuntimeConfig {
            connect_timeout: std::time::Duration::from_millis(100),
            ..in_memory_config()
        };
        let (a, _) = solver_pair(config);

        let err = a.connect(&peer_settings("lonely", "nobody")).await.unwrap_err();
        assert!(matches!(err, CoSimError::Transport(_)));
        assert_eq!(a.connection_status("lonely_nobody"), ConnectionStatus::NotConnected);
    }
}

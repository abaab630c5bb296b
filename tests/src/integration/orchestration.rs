//! # Remote Control Scenarios
//!
//! A controller drives the solution loop of a controlled solver through
//! registered functions.

#[cfg(test)]
mod tests {
    use super::super::*;
    use cosim_io::{AsyncFunction, CoSimError, Result, Vector};
    use parking_lot::Mutex;
    use std::sync::Arc;

    async fn connected() -> (CoSimIo, CoSimIo, String) {
        let (controller, controlled) = solver_pair(in_memory_config());
        let name = connect_pair(&controller, "controller", &controlled, "solver").await;
        (controller, controlled, name)
    }

    fn function_settings(connection_name: &str, function_name: &str) -> Info {
        Info::new()
            .with("connection_name", connection_name)
            .with("function_name", function_name)
    }

    fn signal(connection_name: &str, control_signal: &str) -> Info {
        Info::new()
            .with("connection_name", connection_name)
            .with("control_signal", control_signal)
    }

    #[tokio::test]
    async fn test_run_invokes_a_then_b_then_exits() {
        let (controller, controlled, name) = connected().await;
        let calls = Arc::new(Mutex::new(Vec::new()));

        for function_name in ["A", "B"] {
            let calls = calls.clone();
            controlled
                .register(
                    &function_settings(&name, function_name),
                    Arc::new(move |_: Info| -> Result<Info> {
                        calls.lock().push(function_name);
                        Ok(Info::new())
                    }),
                )
                .unwrap();
        }

        let runner_io = controlled.clone();
        let run_settings = Info::new().with("connection_name", name.as_str());
        let runner = tokio::spawn(async move { runner_io.run(&run_settings).await });

        within_deadline(async {
            for control_signal in ["A", "B", "exit"] {
                controller
                    .send_control_signal(&signal(&name, control_signal))
                    .await
                    .unwrap();
            }
        })
        .await;

        let result = within_deadline(runner).await.unwrap().unwrap();
        assert_eq!(*calls.lock(), vec!["A", "B"]);
        assert_eq!(result.get_int("number_of_calls").unwrap(), 2);

        disconnect_pair(&controller, &controlled, &name).await;
    }

    #[tokio::test]
    async fn test_callbacks_exchange_data_with_the_controller() {
        let (controller, controlled, name) = connected().await;
        let state = Arc::new(Mutex::new(Vector::new()));

        // "import_load" pulls data from the controller, "solve" doubles it,
        // "export_result" hands it back
        {
            let io = controlled.clone();
            let state = state.clone();
            controlled
                .register(
                    &function_settings(&name, "import_load"),
                    Arc::new(AsyncFunction(move |settings: Info| {
                        let io = io.clone();
                        let state = state.clone();
                        async move {
                            let connection_name = settings.get_string("connection_name")?;
                            let mut load = Vector::new();
                            io.import_data(&on(&connection_name, "load"), &mut load).await?;
                            *state.lock() = load;
                            Ok::<_, CoSimError>(Info::new())
                        }
                    })),
                )
                .unwrap();
        }
        {
            let state = state.clone();
            controlled
                .register(
                    &function_settings(&name, "solve"),
                    Arc::new(move |_: Info| -> Result<Info> {
                        let doubled: Vector = state.lock().iter().map(|v| v * 2.0).collect();
                        *state.lock() = doubled;
                        Ok(Info::new())
                    }),
                )
                .unwrap();
        }
        {
            let io = controlled.clone();
            let state = state.clone();
            controlled
                .register(
                    &function_settings(&name, "export_result"),
                    Arc::new(AsyncFunction(move |settings: Info| {
                        let io = io.clone();
                        let values = state.lock().clone();
                        async move {
                            let connection_name = settings.get_string("connection_name")?;
                            io.export_data(&on(&connection_name, "result"), &values).await
                        }
                    })),
                )
                .unwrap();
        }

        let runner_io = controlled.clone();
        let run_settings = Info::new().with("connection_name", name.as_str());
        let runner = tokio::spawn(async move { runner_io.run(&run_settings).await });

        let mut result = Vector::new();
        within_deadline(async {
            for step in 1..=3 {
                let load = vec![f64::from(step), -f64::from(step)];
                controller.send_control_signal(&signal(&name, "import_load")).await.unwrap();
                controller.export_data(&on(&name, "load"), &load).await.unwrap();
                controller.send_control_signal(&signal(&name, "solve")).await.unwrap();
                controller
                    .send_control_signal(&signal(&name, "export_result"))
                    .await
                    .unwrap();
                controller.import_data(&on(&name, "result"), &mut result).await.unwrap();
                assert_eq!(result.as_slice(), &[2.0 * f64::from(step), -2.0 * f64::from(step)]);
            }
            controller.send_control_signal(&signal(&name, "exit")).await.unwrap();
        })
        .await;

        let summary = within_deadline(runner).await.unwrap().unwrap();
        assert_eq!(summary.get_int("number_of_calls").unwrap(), 9);
    }

    #[tokio::test]
    async fn test_nested_settings_are_forwarded() {
        let (controller, controlled, name) = connected().await;
        let received = Arc::new(Mutex::new(None));

        let sink = received.clone();
        controlled
            .register(
                &function_settings(&name, "advance"),
                Arc::new(move |settings: Info| -> Result<Info> {
                    *sink.lock() = Some(settings);
                    Ok(Info::new())
                }),
            )
            .unwrap();

        let runner_io = controlled.clone();
        let run_settings = Info::new().with("connection_name", name.as_str());
        let runner = tokio::spawn(async move { runner_io.run(&run_settings).await });

        let nested = Info::new().with("time", 0.25).with("step", 3);
        within_deadline(async {
            controller
                .send_control_signal(&signal(&name, "advance").with("settings", nested))
                .await
                .unwrap();
            controller.send_control_signal(&signal(&name, "exit")).await.unwrap();
        })
        .await;
        within_deadline(runner).await.unwrap().unwrap();

        let settings = received.lock().clone().unwrap();
        assert_eq!(settings.get_double("time").unwrap(), 0.25);
        assert_eq!(settings.get_int("step").unwrap(), 3);
        assert_eq!(settings.get_string("connection_name").unwrap(), name);
    }

    #[tokio::test]
    async fn test_unregistered_signal_stops_run_and_fails_controller() {
        let (controller, controlled, name) = connected().await;

        let runner_io = controlled.clone();
        let run_settings = Info::new().with("connection_name", name.as_str());
        let runner = tokio::spawn(async move { runner_io.run(&run_settings).await });

        let sent = within_deadline(controller.send_control_signal(&signal(&name, "missing"))).await;
        let ran = within_deadline(runner).await.unwrap();

        assert!(sent.unwrap_err().is_rendezvous_failure());
        assert!(matches!(ran, Err(CoSimError::ProtocolViolation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_reserved_and_duplicate_names() {
        let (_, controlled, name) = connected().await;
        let noop = || -> Arc<dyn cosim_io::RemoteFunction> {
            Arc::new(|_: Info| -> Result<Info> { Ok(Info::new()) })
        };

        controlled
            .register(&function_settings(&name, "step"), noop())
            .unwrap();
        assert!(matches!(
            controlled.register(&function_settings(&name, "step"), noop()),
            Err(CoSimError::DuplicateFunction(_))
        ));
        assert!(matches!(
            controlled.register(&function_settings(&name, "exit"), noop()),
            Err(CoSimError::InvalidName { .. })
        ));
        assert!(matches!(
            controlled.register(&function_settings("unknown_conn", "step"), noop()),
            Err(CoSimError::NotConnected { .. })
        ));
    }
}

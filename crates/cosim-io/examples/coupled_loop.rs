//! Two solvers coupled in one process: "fluid" drives the time loop of
//! "structure" and trades interface loads for displacements each step.
//!
//! ```bash
//! COSIM_LOG_LEVEL=debug COSIM_ECHO_LEVEL=2 cargo run -p cosim-io --example coupled_loop
//! ```

use cosim_io::{AsyncFunction, CoSimApi, CoSimError, CoSimIo, Info, Result, Vector};
use cosim_telemetry::{init_logging, TelemetryConfig};
use std::sync::Arc;
use tracing::info;

const STEPS: u32 = 5;

fn on(identifier: &str) -> Info {
    Info::new()
        .with("connection_name", "fluid_structure")
        .with("identifier", identifier)
}

fn control(signal: &str) -> Info {
    Info::new()
        .with("connection_name", "fluid_structure")
        .with("control_signal", signal)
}

async fn structure(io: CoSimIo) -> Result<Info> {
    io.connect(&Info::new().with("my_name", "structure").with("connect_to", "fluid"))
        .await?;

    let handle = io.clone();
    io.register(
        &Info::new()
            .with("connection_name", "fluid_structure")
            .with("function_name", "solve"),
        Arc::new(AsyncFunction(move |_: Info| {
            let io = handle.clone();
            async move {
                let mut load = Vector::new();
                io.import_data(&on("load"), &mut load).await?;
                // a very stiff structure
                let displacement: Vector = load.iter().map(|f| f * 1e-3).collect();
                io.export_data(&on("displacement"), &displacement).await
            }
        })),
    )?;

    let summary = io.run(&Info::new().with("connection_name", "fluid_structure")).await?;
    io.disconnect(&Info::new().with("connection_name", "fluid_structure"))
        .await?;
    Ok(summary)
}

async fn fluid(io: CoSimIo) -> Result<()> {
    io.connect(&Info::new().with("my_name", "fluid").with("connect_to", "structure"))
        .await?;

    let mut displacement = Vector::new();
    for step in 1..=STEPS {
        let load: Vec<f64> = (0..4).map(|i| f64::from(step * 100 + i)).collect();
        io.send_control_signal(&control("solve")).await?;
        io.export_data(&on("load"), &load).await?;
        io.import_data(&on("displacement"), &mut displacement).await?;
        info!(step, displacement = ?displacement.as_slice(), "Step coupled");
    }
    io.send_control_signal(&control("exit")).await?;

    io.disconnect(&Info::new().with("connection_name", "fluid_structure"))
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(&TelemetryConfig::for_solver("coupled-loop"))?;

    let structure_task = tokio::spawn(structure(CoSimIo::new()));
    fluid(CoSimIo::new()).await?;
    let summary = structure_task
        .await
        .map_err(|e| CoSimError::ProtocolViolation(e.to_string()))??;

    info!(
        number_of_calls = summary.get_int("number_of_calls")?,
        "Structure finished"
    );
    Ok(())
}

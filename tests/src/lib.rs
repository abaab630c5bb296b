//! # CoSim-Link Test Suite
//!
//! Cross-crate scenarios: two coupled solvers, each with its own `CoSimIo`,
//! run as tasks of one test process.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs            # fixtures: solver pairs, deadlines
//!     ├── connection.rs     # lifecycle, conflicts, reconnects
//!     ├── exchange.rs       # info / data / mesh round-trips
//!     ├── orchestration.rs  # register / run / control signals
//!     └── socket.rs         # the same flows over TCP
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cosim-tests
//! cargo test -p cosim-tests integration::socket::
//!
//! # Benchmarks
//! cargo bench -p cosim-tests
//! ```

#![allow(dead_code)]

pub mod integration;

//! df-graph: host part/pool model for dockflow.
//!
//! Provides:
//! - The `PartGraph` trait: the read-only queries and narrow mutation entry
//!   points the pump core needs from whatever owns the real parts
//! - `Vessel`, an in-memory `PartGraph` built incrementally with validation
//! - Side partitioning around a docking connection
//!
//! # Example
//!
//! ```
//! use df_core::kg;
//! use df_graph::{partition_pair, VesselBuilder};
//!
//! let mut builder = VesselBuilder::new();
//! let tank_a = builder.add_part("TankA", kg(1.0));
//! let port_a = builder.attach_part("PortA", tank_a, kg(0.1));
//! let port_b = builder.add_part("PortB", kg(0.1));
//! let tank_b = builder.attach_part("TankB", port_b, kg(1.0));
//! builder.add_pool(tank_a, "LiquidFuel", 10.0, 100.0);
//! builder.add_pool(tank_b, "LiquidFuel", 90.0, 100.0);
//! builder.add_docking_port(port_a);
//! builder.add_docking_port(port_b);
//! builder.dock(port_a, port_b);
//! let vessel = builder.build().unwrap();
//!
//! let (near, far) = partition_pair(&vessel, port_a, port_b);
//! assert!(near.contains(tank_a));
//! assert!(far.contains(tank_b));
//! ```

pub mod builder;
pub mod error;
pub mod host;
pub mod model;
pub mod partition;
pub(crate) mod validate;
pub mod vessel;

// Re-exports for ergonomics
pub use builder::{DEFAULT_MAX_TEMPERATURE_K, DEFAULT_TEMPERATURE_K, VesselBuilder};
pub use error::{GraphError, GraphResult};
pub use host::PartGraph;
pub use model::{DockingPort, FlowMode, LinkState, Part, Pool};
pub use partition::{Side, TraversalOverrun, partition, partition_pair};
pub use vessel::{DEFAULT_DRIVING_RESOURCE, Vessel};

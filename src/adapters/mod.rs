//! Adapters — concrete implementations of the domain's port traits.
//!
//! | Adapter               | Implements                        | Connects to                  |
//! |------------------------|------------------------------------|-------------------------------|
//! | `sensor_adapter`       | `SensorPort`                       | 1-Wire device files           |
//! | `gpio_adapter`         | `ActuatorPort`                     | sysfs GPIO actuator lines     |
//! | `comms_adapter`        | `CommandLinkPort`                  | sysfs GPIO command/response lines |
//! | `persistence_adapter`  | `PersistencePort`                  | run-cycle ledger file         |
//! | `report_adapter`       | `ReportSink`                       | CSV / text table / JSON files |

pub mod comms_adapter;
pub mod gpio_adapter;
pub mod persistence_adapter;
pub mod report_adapter;
pub mod sensor_adapter;

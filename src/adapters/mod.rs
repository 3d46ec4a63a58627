//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to               |
//! |------------|---------------------|---------------------------|
//! | `hardware` | LightSensorPort     | LED-as-photodiode, GPIO   |
//! |            | IndicatorPort       | LED anode, GPIO           |
//! |            | SprayPort           | Motor MOSFET, GPIO        |
//! |            | DelayNs             | `time::SystemDelay`       |
//! | `log_sink` | EventSink           | Serial log output         |
//! | `nvs`      | ModeStorePort       | NVS / in-memory byte      |
//! | `time`     | DelayNs             | FreeRTOS delay, esp_timer |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;

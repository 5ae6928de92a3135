//! Command dispatch and interaction-mode engine.
//! This file wires focused engine submodules together.

use super::*;
use tracing::{debug, error, warn};

mod attacks;
mod dispatch;
mod modes;
mod movement;
mod rounds;
mod sight;

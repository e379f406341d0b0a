use parking_lot::RwLock;
use tracing::debug;

use crate::{parser::config::ParserConfig, service::SkdService};

pub const DEFAULT_SERVICE: &str = "default";

/// Stock service: plain factories plus a parser configuration
///
/// Without an explicit configuration it adopts the configuration of the
/// service it replaces.
#[derive(Debug, Default)]
pub struct DefaultService {
    config: RwLock<ParserConfig>,
    explicit: bool,
}

impl DefaultService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config: RwLock::new(config),
            explicit: true,
        }
    }
}

impl SkdService for DefaultService {
    fn kind(&self) -> &'static str {
        DEFAULT_SERVICE
    }

    fn initialize(&self) {
        debug!("Initializing default service");
    }

    fn finalize(&self) {
        debug!("Finalizing default service");
    }

    fn grab_info(&self, previous: Option<&dyn SkdService>, previous_kind: Option<&'static str>) {
        if self.explicit {
            return;
        }
        if let Some(previous) = previous {
            debug!(
                "Adopting parser configuration of {}",
                previous_kind.unwrap_or("unknown service")
            );
            *self.config.write() = previous.parser_config();
        }
    }

    fn parser_config(&self) -> ParserConfig {
        self.config.read().clone()
    }
}

//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use betrayal_core::{Layout, DEFAULT_BOARD_SIZE};

/// Settings for one client session
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game server
    pub server_url: String,
    /// Cells per side of the square board index
    pub board_size: usize,
    /// Render extent in surface pixels (width, height)
    pub extent: (f64, f64),
    /// How long a transient notice stays up
    pub notice_duration: Duration,
    /// Pause between the final snapshot and the game-over screen
    pub game_over_delay: Duration,
    /// File holding the persisted player id
    pub identity_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:8080/ws".to_string(),
            board_size: DEFAULT_BOARD_SIZE,
            extent: (800.0, 800.0),
            notice_duration: Duration::from_secs(2),
            game_over_delay: Duration::from_secs(2),
            identity_path: PathBuf::from(".betrayal/identity.json"),
        }
    }
}

impl ClientConfig {
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_extent(mut self, width: f64, height: f64) -> Self {
        self.extent = (width, height);
        self
    }

    pub fn with_identity_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_path = path.into();
        self
    }

    /// Layout fitted to the configured extent
    pub fn layout(&self) -> Layout {
        Layout::fit(self.extent.0, self.extent.1, self.board_size)
    }
}

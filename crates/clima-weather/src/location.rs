//! Sources for the user's current position.

use async_trait::async_trait;

use crate::types::{Coordinates, LocationError};

/// Something that can report where the user is
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Whether asking for a position can succeed at all
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A position configured ahead of time
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Used when no position source is available at all
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocation;

#[async_trait]
impl LocationSource for UnsupportedLocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

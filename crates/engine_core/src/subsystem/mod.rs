//! Subsystem contract
//!
//! The engine owns one subsystem per [`SubsystemSlot`] and drives them in
//! [`SubsystemSlot::INIT_ORDER`]. Concrete physics, audio, scripting and so
//! on live outside this crate and plug in through [`Subsystem`].

use std::fmt;

use crate::engine::EngineContext;

/// Subsystem errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsystemError {
    /// Startup failed
    #[error("{subsystem} failed to initialize: {reason}")]
    InitFailed {
        /// Subsystem name
        subsystem: String,
        /// What went wrong
        reason: String,
    },
}

impl SubsystemError {
    /// Shorthand for [`SubsystemError::InitFailed`]
    pub fn init_failed(subsystem: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InitFailed {
            subsystem: subsystem.into(),
            reason: reason.into(),
        }
    }
}

/// A unit of per-frame engine work
pub trait Subsystem {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// One-time startup, called in dependency order
    fn initialize(&mut self, _ctx: &mut EngineContext) -> Result<(), SubsystemError> {
        Ok(())
    }

    /// Advance by `delta_time` seconds
    fn update(&mut self, delta_time: f32, ctx: &mut EngineContext);

    /// Release resources; called in reverse initialization order
    fn shutdown(&mut self, _ctx: &mut EngineContext) {}
}

/// Fixed subsystem positions in the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsystemSlot {
    /// Platform input polling
    Input,
    /// Script runtime; optional
    Scripting,
    /// Physics integration
    Physics,
    /// Audio mixing
    Audio,
    /// Networking
    Network,
    /// Game rules
    Gamemode,
}

impl SubsystemSlot {
    /// Initialization and update order
    pub const INIT_ORDER: [Self; 6] = [
        Self::Input,
        Self::Scripting,
        Self::Physics,
        Self::Audio,
        Self::Network,
        Self::Gamemode,
    ];

    /// Whether a failed initialization is tolerated
    pub fn is_soft_dependency(self) -> bool {
        matches!(self, Self::Scripting)
    }

    /// Lowercase slot name
    pub fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Scripting => "scripting",
            Self::Physics => "physics",
            Self::Audio => "audio",
            Self::Network => "network",
            Self::Gamemode => "gamemode",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SubsystemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placeholder used for slots the application leaves empty
#[derive(Debug)]
pub struct IdleSubsystem {
    name: String,
}

impl IdleSubsystem {
    /// Idle subsystem standing in for `slot`
    pub fn for_slot(slot: SubsystemSlot) -> Self {
        Self {
            name: format!("{slot} (idle)"),
        }
    }
}

impl Subsystem for IdleSubsystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, _delta_time: f32, _ctx: &mut EngineContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_order_matches_discriminants() {
        for (i, slot) in SubsystemSlot::INIT_ORDER.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_only_scripting_is_soft() {
        let soft: Vec<_> = SubsystemSlot::INIT_ORDER
            .iter()
            .filter(|slot| slot.is_soft_dependency())
            .collect();
        assert_eq!(soft, vec![&SubsystemSlot::Scripting]);
    }

    #[test]
    fn test_idle_name() {
        assert_eq!(IdleSubsystem::for_slot(SubsystemSlot::Audio).name(), "audio (idle)");
        assert_eq!(
            SubsystemError::init_failed("physics", "no solver").to_string(),
            "physics failed to initialize: no solver"
        );
    }
}

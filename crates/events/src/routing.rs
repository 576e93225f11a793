//! Call-site routing hints for a single emit.

use crate::envelope::{FrameHandle, TabId};

/// Where an envelope goes once it leaves the local context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingHint {
    /// Every context listening on the extension runtime.
    Broadcast,
    /// One tab's content script.
    Tab(TabId),
    /// The immediate parent document.
    ParentFrame(FrameHandle),
}

/// Both a tab and a parent frame were targeted by one emit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("emit targets both tab {tab} and {frame}")]
pub struct RoutingConflict {
    pub tab: TabId,
    pub frame: FrameHandle,
}

/// Options recognized by `emit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Skip transports and invoke local listeners only.
    pub local_only: bool,
    pub target_tab: Option<TabId>,
    pub target_parent_frame: Option<FrameHandle>,
}

impl EmitOptions {
    pub fn local() -> Self {
        Self {
            local_only: true,
            ..Self::default()
        }
    }

    pub fn to_tab(tab: TabId) -> Self {
        Self {
            target_tab: Some(tab),
            ..Self::default()
        }
    }

    pub fn to_parent(frame: FrameHandle) -> Self {
        Self {
            target_parent_frame: Some(frame),
            ..Self::default()
        }
    }

    /// Collapse the targets into a single hint.
    pub fn routing_hint(&self) -> Result<RoutingHint, RoutingConflict> {
        match (self.target_tab, self.target_parent_frame) {
            (Some(tab), Some(frame)) => Err(RoutingConflict { tab, frame }),
            (Some(tab), None) => Ok(RoutingHint::Tab(tab)),
            (None, Some(frame)) => Ok(RoutingHint::ParentFrame(frame)),
            (None, None) => Ok(RoutingHint::Broadcast),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_selection() {
        assert_eq!(EmitOptions::default().routing_hint(), Ok(RoutingHint::Broadcast));
        assert_eq!(
            EmitOptions::to_tab(TabId(7)).routing_hint(),
            Ok(RoutingHint::Tab(TabId(7)))
        );
        assert_eq!(
            EmitOptions::to_parent(FrameHandle::new(2)).routing_hint(),
            Ok(RoutingHint::ParentFrame(FrameHandle::new(2)))
        );
    }

    #[test]
    fn test_conflicting_targets() {
        let options = EmitOptions {
            target_tab: Some(TabId(1)),
            target_parent_frame: Some(FrameHandle::new(9)),
            ..EmitOptions::default()
        };
        let err = options.routing_hint().unwrap_err();
        assert_eq!(err.tab, TabId(1));
        assert_eq!(err.frame, FrameHandle::new(9));
    }
}

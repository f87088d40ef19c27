pub mod ui;

use glam::Vec2;

/// Expanded panel size in logical points.
pub const EXPANDED_SIZE: Vec2 = Vec2::new(170.0, 50.0);
/// Minimized panel size in logical points.
pub const MINIMIZED_SIZE: Vec2 = Vec2::new(50.0, 50.0);
/// Gap between the panel and the right screen edge.
const RIGHT_MARGIN: f32 = 10.0;
/// Distance from the panel top to the bottom screen edge.
const BOTTOM_OFFSET: f32 = 60.0;
/// Padding between the panel background and its buttons.
pub const PANEL_MARGIN: f32 = 8.0;
/// Volume change per mouse-wheel notch over the mute button.
pub const VOLUME_STEP: f32 = 0.1;

/// A button press on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    ToggleMinimize,
    ToggleMute,
    /// Wheel notches over the mute button; positive is louder.
    AdjustVolume(i8),
    Close,
}

/// What the application has to do after a panel action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEffect {
    /// Only the panel itself changed.
    None,
    /// Flip the music between muted and playing.
    ToggleMute,
    /// Change the music volume by this many [`VOLUME_STEP`]s.
    AdjustVolume(i8),
    /// Tear everything down and exit.
    Shutdown,
}

/// Axis-aligned rectangle in logical points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl PanelRect {
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x < max.x && p.y >= self.min.y && p.y < max.y
    }
}

/// Minimize and mute state of the on-screen control panel.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    minimized: bool,
    muted: bool,
}

impl ControlPanel {
    pub fn new(muted: bool) -> Self {
        Self {
            minimized: false,
            muted,
        }
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mirror the audio controller's mute flag after it toggled.
    pub fn sync_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn apply(&mut self, action: PanelAction) -> PanelEffect {
        match action {
            PanelAction::ToggleMinimize => {
                self.minimized = !self.minimized;
                log::debug!("Control panel minimized: {}", self.minimized);
                PanelEffect::None
            }
            PanelAction::ToggleMute => PanelEffect::ToggleMute,
            PanelAction::AdjustVolume(0) => PanelEffect::None,
            PanelAction::AdjustVolume(steps) => PanelEffect::AdjustVolume(steps),
            PanelAction::Close => PanelEffect::Shutdown,
        }
    }

    pub fn size(&self) -> Vec2 {
        if self.minimized {
            MINIMIZED_SIZE
        } else {
            EXPANDED_SIZE
        }
    }

    /// Room left for the buttons once [`PANEL_MARGIN`] is taken off each side.
    pub fn inner_size(&self) -> Vec2 {
        (self.size() - Vec2::splat(2.0 * PANEL_MARGIN)).max(Vec2::ZERO)
    }

    /// Panel rect for a screen of `screen` logical points, anchored bottom-right.
    pub fn rect(&self, screen: Vec2) -> PanelRect {
        let size = self.size();
        PanelRect {
            min: Vec2::new(screen.x - size.x - RIGHT_MARGIN, screen.y - BOTTOM_OFFSET),
            size,
        }
    }

    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn contains(&self, screen: Vec2, point: Vec2) -> bool {
        self.rect(screen).contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Vec2 = Vec2::new(1920.0, 1080.0);

    #[test]
    fn expanded_geometry_is_anchored_bottom_right() {
        let panel = ControlPanel::new(false);
        let rect = panel.rect(SCREEN);
        assert_eq!(rect.min, Vec2::new(1740.0, 1020.0));
        assert_eq!(rect.size, EXPANDED_SIZE);
    }

    #[test]
    fn minimize_shrinks_and_shifts_right() {
        let mut panel = ControlPanel::new(false);
        assert_eq!(panel.apply(PanelAction::ToggleMinimize), PanelEffect::None);
        assert!(panel.is_minimized());
        let rect = panel.rect(SCREEN);
        assert_eq!(rect.min, Vec2::new(1860.0, 1020.0));
        assert_eq!(rect.size, MINIMIZED_SIZE);

        panel.apply(PanelAction::ToggleMinimize);
        assert!(!panel.is_minimized());
    }

    #[test]
    fn mute_and_close_map_to_app_effects() {
        let mut panel = ControlPanel::new(true);
        assert!(panel.is_muted());
        assert_eq!(panel.apply(PanelAction::ToggleMute), PanelEffect::ToggleMute);
        assert!(panel.is_muted());
        panel.sync_muted(false);
        assert!(!panel.is_muted());

        assert_eq!(panel.apply(PanelAction::Close), PanelEffect::Shutdown);
        assert!(!panel.is_minimized());
    }

    #[test]
    fn wheel_steps_become_volume_changes() {
        let mut panel = ControlPanel::new(false);
        assert_eq!(panel.apply(PanelAction::AdjustVolume(2)), PanelEffect::AdjustVolume(2));
        assert_eq!(panel.apply(PanelAction::AdjustVolume(-1)), PanelEffect::AdjustVolume(-1));
        assert_eq!(panel.apply(PanelAction::AdjustVolume(0)), PanelEffect::None);
        assert!(!panel.is_muted());
    }

    #[test]
    fn drawn_frame_fills_the_hit_test_rect() {
        let mut panel = ControlPanel::new(false);
        for _ in 0..2 {
            let rect = panel.rect(SCREEN);
            let drawn = panel.inner_size() + Vec2::splat(2.0 * PANEL_MARGIN);
            assert_eq!(drawn, rect.size);
            assert_eq!(rect.max(), rect.min + drawn);
            panel.apply(PanelAction::ToggleMinimize);
        }
        assert_eq!(panel.inner_size(), Vec2::new(34.0, 34.0));
    }

    #[test]
    fn hit_test_uses_current_size() {
        let mut panel = ControlPanel::new(false);
        let inside_expanded_only = Vec2::new(1750.0, 1030.0);
        assert!(panel.contains(SCREEN, inside_expanded_only));
        assert!(!panel.contains(SCREEN, Vec2::new(1000.0, 500.0)));
        assert!(!panel.contains(SCREEN, Vec2::new(1910.0, 1030.0)));

        panel.apply(PanelAction::ToggleMinimize);
        assert!(!panel.contains(SCREEN, inside_expanded_only));
        assert!(panel.contains(SCREEN, Vec2::new(1870.0, 1030.0)));
    }
}

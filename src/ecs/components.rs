use crate::surface::ItemId;

/// The surface item a peep is drawn through.
///
/// Peeps also carry exactly one of `peep::animator::Animator` (sprite-backed)
/// or `peep::bounce::Bouncer` (fallback square).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneItem(pub ItemId);

/// Whether a primary map click creates a bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementMode {
    #[default]
    Browsing,
    Placing,
}

impl PlacementMode {
    /// Flips between browsing and placing. This is the only transition.
    pub fn toggle(&mut self) {
        *self = match self {
            PlacementMode::Browsing => PlacementMode::Placing,
            PlacementMode::Placing => PlacementMode::Browsing,
        };
    }

    pub fn is_placing(&self) -> bool {
        *self == PlacementMode::Placing
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlacementMode::Browsing => "browse",
            PlacementMode::Placing => "add bins",
        }
    }
}

use crate::View;

/// Navigation indicators and view containers, as provided by the UI layer.
pub trait ViewSurface: Send + Sync {
    fn set_nav_active(&self, view: View, active: bool);
    fn set_container_visible(&self, view: View, visible: bool);
}

/// What the caller has to do after a view switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowEffect {
    None,
    /// First entry into the map view: the widget must be created now that
    /// its container is visible.
    InitializeMap,
}

#[derive(Debug, Default)]
pub struct ViewManager {
    active: View,
}

impl ViewManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn show(&mut self, view: View, surface: &dyn ViewSurface, map_exists: bool) -> ShowEffect {
        self.active = view;

        for candidate in View::all() {
            surface.set_nav_active(*candidate, *candidate == view);
        }
        // Hide first so there is never a moment with both visible.
        for candidate in View::all().iter().filter(|v| **v != view) {
            surface.set_container_visible(*candidate, false);
        }
        surface.set_container_visible(view, true);

        tracing::debug!(view = %view, "view shown");

        if view == View::Map && !map_exists {
            ShowEffect::InitializeMap
        } else {
            ShowEffect::None
        }
    }
}

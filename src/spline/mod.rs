mod builders;
mod components;
mod control_point;
mod error;
pub mod evaluator;
mod query;
mod sample;
mod types;

pub use builders::{integrate_clothoid, CLOTHOID_INTEGRATION_INTERVALS};
pub use components::*;
pub use control_point::*;
pub use error::SplineError;
pub use query::SplineLocation;
pub use sample::SampledPoint;
pub use types::*;

use bevy::prelude::*;

/// Global defaults for splines.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource, Default)]
pub struct SplineSettings {
    /// Refresh dirty splines automatically every frame.
    pub auto_refresh: bool,
    /// Interpolation given to splines spawned through [`Self::new_spline`].
    pub default_interpolation: Interpolation,
    /// Handle distance given to splines spawned through [`Self::new_spline`].
    pub default_handle_distance: f32,
}

impl Default for SplineSettings {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            default_interpolation: Interpolation::default(),
            default_handle_distance: DEFAULT_HANDLE_DISTANCE,
        }
    }
}

impl SplineSettings {
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    pub fn with_default_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.default_interpolation = interpolation;
        self
    }

    pub fn with_default_handle_distance(mut self, distance: f32) -> Self {
        self.default_handle_distance = distance;
        self
    }

    /// An empty spline configured with these defaults.
    pub fn new_spline(&self, spline_type: SplineType) -> Spline {
        Spline::new(spline_type, Vec::new())
            .with_interpolation(self.default_interpolation)
            .with_initial_handle_distance(self.default_handle_distance)
    }
}

/// System sets for ordering spline work within `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplineSystems {
    /// Rebuild samples of dirty splines.
    Refresh,
    /// Move followers along refreshed splines.
    Follow,
}

/// Plugin that registers spline types and keeps dirty splines refreshed.
pub struct SplinePlugin;

impl Plugin for SplinePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SplineType>()
            .register_type::<Interpolation>()
            .register_type::<HandleMode>()
            .register_type::<ControlPoint>()
            .register_type::<SampledPoint>()
            .register_type::<Spline>()
            .register_type::<SplineSettings>()
            .init_resource::<SplineSettings>()
            .configure_sets(Update, SplineSystems::Refresh.before(SplineSystems::Follow))
            .add_systems(Update, refresh_dirty_splines.in_set(SplineSystems::Refresh));
    }
}

/// Refresh every spline whose control points or configuration changed.
pub fn refresh_dirty_splines(settings: Res<SplineSettings>, mut splines: Query<&mut Spline>) {
    if !settings.auto_refresh {
        return;
    }
    for mut spline in &mut splines {
        // Check through a shared borrow so clean splines are not flagged as changed
        if spline.is_dirty() {
            spline.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(SplinePlugin);
        app
    }

    #[test]
    fn test_dirty_splines_refresh_on_update() {
        let mut app = app();
        let entity = app
            .world_mut()
            .spawn(Spline::from_positions(
                SplineType::Linear,
                [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 1.0)],
            ))
            .id();

        app.update();

        let spline = app.world().get::<Spline>(entity).unwrap();
        assert!(!spline.is_dirty());
        assert_eq!(spline.samples().len(), 3);
        assert!((spline.total_length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_auto_refresh_can_be_disabled() {
        let mut app = app();
        app.insert_resource(SplineSettings::default().with_auto_refresh(false));
        let entity = app
            .world_mut()
            .spawn(Spline::from_positions(SplineType::Linear, [Vec3::ZERO, Vec3::X]))
            .id();

        app.update();

        assert!(app.world().get::<Spline>(entity).unwrap().is_dirty());
    }

    #[test]
    fn test_settings_configure_new_splines() {
        let settings = SplineSettings::default()
            .with_default_interpolation(Interpolation::FixedSteps(6))
            .with_default_handle_distance(2.0);
        let spline = settings.new_spline(SplineType::Hermite);
        assert_eq!(spline.interpolation(), Interpolation::FixedSteps(6));
        assert_eq!(spline.initial_handle_distance, 2.0);
        assert_eq!(spline.spline_type(), SplineType::Hermite);
    }
}

//! Visualization utilities for surface_navigation
//!
//! Top-down (x/y) plots of the ground surface, its distance field,
//! obstacles, and the robot trajectory using gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{GroundPoint, NavResult, NavigationError, Point3D, Pose3D, SpatialIndex, Visualizable};
use crate::mapping::GroundSurface;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const BLUE: &str = "#0000FF";
    pub const CYAN: &str = "#00FFFF";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const GOAL: &str = BLUE;
    pub const TRAIL: &str = RED;
    pub const ROBOT: &str = CYAN;
    pub const UNREACHABLE: &str = GRAY;

    /// Near-to-far ramp for the distance field
    pub const FIELD_RAMP: [&str; 5] = ["#1A9850", "#91CF60", "#FEE08B", "#FC8D59", "#D73027"];
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// Group ground points into field bands; the last band holds unreachable points
pub fn field_bands(ground: &[GroundPoint], bands: usize) -> Vec<Vec<Point3D>> {
    let mut out = vec![Vec::new(); bands + 1];
    for g in ground {
        let slot = if g.distance.is_finite() && g.distance < 1.0 {
            ((g.distance * bands as f64) as usize).min(bands - 1)
        } else {
            bands
        };
        out[slot].push(g.position);
    }
    out
}

/// Equal x/y scaling for top-down plots
const ASPECT_RATIO: f64 = 1.0;

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis range
    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    /// Set Y axis range
    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point3D], style: &PointStyle) -> &mut Self {
        if points.is_empty() {
            return self;
        }
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();

        self.figure.axes2d()
            .points(&x, &y, &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ]);
        self
    }

    /// Plot obstacle points
    pub fn plot_obstacles(&mut self, obstacles: &[Point3D]) -> &mut Self {
        self.plot_points(
            obstacles,
            &PointStyle::new(colors::OBSTACLE, "Obstacles").with_symbol('S').with_size(0.5),
        )
    }

    /// Plot ground points colored by their distance value
    pub fn plot_ground_field(&mut self, ground: &[GroundPoint]) -> &mut Self {
        let bands = field_bands(ground, colors::FIELD_RAMP.len());
        for (i, points) in bands.iter().enumerate() {
            let (color, caption) = match colors::FIELD_RAMP.get(i) {
                Some(color) => (*color, format!("field {}/{}", i + 1, colors::FIELD_RAMP.len())),
                None => (colors::UNREACHABLE, "unreachable".to_string()),
            };
            self.plot_points(points, &PointStyle::new(color, &caption).with_symbol('s').with_size(0.4));
        }
        self
    }

    /// Plot the robot's trajectory
    pub fn plot_trail(&mut self, trail: &[Point3D]) -> &mut Self {
        let x: Vec<f64> = trail.iter().map(|p| p.x).collect();
        let y: Vec<f64> = trail.iter().map(|p| p.y).collect();

        self.figure.axes2d()
            .lines(&x, &y, &[
                Caption("Trajectory"),
                Color(colors::TRAIL),
                LineWidth(2.0),
            ]);
        self
    }

    /// Plot robot pose with direction indicator
    pub fn plot_robot(&mut self, pose: &Pose3D, size: f64) -> &mut Self {
        let (x, y, yaw) = (pose.position.x, pose.position.y, pose.yaw());
        self.figure.axes2d()
            .points(&[x], &[y], &[
                Caption("Robot"),
                Color(colors::ROBOT),
                PointSymbol('O'),
                PointSize(size),
            ]);

        // Plot direction line (arrow substitute)
        let arrow_len = size * 0.5;
        self.figure.axes2d()
            .lines(&[x, x + arrow_len * yaw.cos()], &[y, y + arrow_len * yaw.sin()], &[
                Color(colors::ROBOT),
                LineWidth(2.0),
            ]);
        self
    }

    /// Plot goal position
    pub fn plot_goal(&mut self, point: Point3D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> NavResult<()> {
        self.apply_settings();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| NavigationError::Visualization(e.to_string()))
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> NavResult<()> {
        self.apply_settings();
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| NavigationError::Visualization(e.to_string()))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        axes.set_aspect_ratio(AutoOption::Fix(ASPECT_RATIO));
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SpatialIndex> Visualizable for GroundSurface<I> {
    fn visualize(&self, vis: &mut Visualizer) {
        vis.plot_ground_field(self.ground());
        vis.plot_obstacles(self.obstacles());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_creation() {
        let mut vis = Visualizer::new();
        assert!(vis.x_range.is_none());
        vis.set_title("field").set_x_range(-1.0, 1.0);
        assert_eq!(vis.title, "field");
        assert_eq!(vis.x_range, Some((-1.0, 1.0)));
    }

    #[test]
    fn test_point_style() {
        let style = PointStyle::new(colors::RED, "Targets").with_size(2.0);
        assert_eq!(style.size, 2.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_field_bands() {
        let at = |d: f64| GroundPoint { position: Point3D::origin(), distance: d };
        let ground = vec![at(0.0), at(0.19), at(0.5), at(0.999), at(1.0), at(f64::INFINITY)];
        let bands = field_bands(&ground, 5);
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0].len(), 2);
        assert_eq!(bands[2].len(), 1);
        assert_eq!(bands[4].len(), 1);
        assert_eq!(bands[5].len(), 2);
    }
}

//! Output region handling.

use smithay::utils::{Logical, Physical, Point, Rectangle, Size, Transform};

use crate::geometry::RectangleEdges;

/// Inset applied to an output's far edges when clamping points.
///
/// This keeps clamped points inside the output, since rectangles exclude
/// their right and bottom edges.
const EDGE_INSET: f64 = 1. / 65536.;

/// Opaque output handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct OutputId(pub u64);

/// Output lifecycle events emitted by the backend.
#[derive(Clone, PartialEq, Debug)]
pub enum OutputEvent {
    Added {
        id: OutputId,
        name: String,
        mode: Size<i32, Physical>,
        scale: f64,
        transform: Transform,
    },
    Removed {
        id: OutputId,
    },
    Frame {
        id: OutputId,
    },
}

/// Wayland output, typically a screen.
#[derive(Clone, Debug)]
pub struct Output {
    pub id: OutputId,
    pub name: String,

    /// Position in the shared layout space.
    pub location: Point<i32, Logical>,

    transform: Transform,
    mode: Size<i32, Physical>,
    scale: f64,
}

impl Output {
    pub fn new(
        id: OutputId,
        name: impl Into<String>,
        mode: Size<i32, Physical>,
        scale: f64,
        transform: Transform,
    ) -> Self {
        Self { id, mode, transform, name: name.into(), scale, location: Default::default() }
    }

    /// Output dimensions after applying transform and scale.
    pub fn resolution(&self) -> Size<i32, Logical> {
        let size = self.transform.transform_size(self.mode);
        size.to_f64().to_logical(self.scale).to_i32_round()
    }

    /// Area covered by this output in layout space.
    pub fn rectangle(&self) -> Rectangle<i32, Logical> {
        Rectangle { loc: self.location, size: self.resolution() }
    }

    /// Point inside this output closest to `point`.
    fn closest_point(&self, point: Point<f64, Logical>) -> Point<f64, Logical> {
        let rect = self.rectangle().to_f64();
        let max_x = (rect.loc.x + rect.size.w - EDGE_INSET).max(rect.loc.x);
        let max_y = (rect.loc.y + rect.size.h - EDGE_INSET).max(rect.loc.y);
        (point.x.clamp(rect.loc.x, max_x), point.y.clamp(rect.loc.y, max_y)).into()
    }
}

/// Output layout.
///
/// Outputs are arranged left to right in the order they were added.
#[derive(Default, Debug)]
pub struct Outputs {
    outputs: Vec<Output>,
}

impl Outputs {
    /// Add an output to the right edge of the layout.
    pub fn add(&mut self, mut output: Output) {
        self.outputs.retain(|o| o.id != output.id);
        let right = self.outputs.iter().map(|o| o.location.x + o.resolution().w).max();
        output.location = (right.unwrap_or(0), 0).into();
        self.outputs.push(output);
    }

    /// Remove an output from the layout.
    pub fn remove(&mut self, id: OutputId) -> Option<Output> {
        let index = self.outputs.iter().position(|output| output.id == id)?;
        Some(self.outputs.remove(index))
    }

    pub fn get(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|output| output.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Output nearest to a point in layout space.
    ///
    /// On ties the output added first wins.
    pub fn closest(&self, point: Point<f64, Logical>) -> Option<&Output> {
        let mut closest: Option<(&Output, f64)> = None;
        for output in &self.outputs {
            let candidate = output.closest_point(point);
            let (dx, dy) = (candidate.x - point.x, candidate.y - point.y);
            let distance = dx * dx + dy * dy;

            if closest.map_or(true, |(_, best)| distance < best) {
                closest = Some((output, distance));
            }
        }
        closest.map(|(output, _)| output)
    }

    /// Area available for placing a window.
    ///
    /// This uses the output closest to the window's center and is anchored at
    /// the layout origin. Without any output, an empty rectangle is returned.
    pub fn usable_area(&self, geometry: Rectangle<i32, Logical>) -> Rectangle<i32, Logical> {
        let center = geometry.to_f64().center();

        match self.closest(center.into()) {
            Some(output) => Rectangle::from_size(output.resolution()),
            None => Rectangle::default(),
        }
    }

    /// Bounding box of all outputs.
    pub fn layout_box(&self) -> Rectangle<i32, Logical> {
        self.outputs
            .iter()
            .map(Output::rectangle)
            .reduce(|a, b| a.merge(b))
            .unwrap_or_default()
    }

    /// Move a point inside the layout.
    ///
    /// Points are left untouched without any output.
    pub fn clamp(&self, point: Point<f64, Logical>) -> Point<f64, Logical> {
        let inside = self.outputs.iter().any(|o| o.rectangle().to_f64().contains(point));
        if inside {
            return point;
        }

        self.closest(point).map_or(point, |output| output.closest_point(point))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn output(id: u64, w: i32, h: i32) -> Output {
        Output::new(OutputId(id), format!("HEADLESS-{id}"), (w, h).into(), 1., Transform::Normal)
    }

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle<i32, Logical> {
        Rectangle { loc: (x, y).into(), size: (w, h).into() }
    }

    #[test]
    fn resolution_applies_scale_and_transform() {
        let scaled = Output::new(OutputId(0), "A", (3840, 2160).into(), 2., Transform::Normal);
        assert_eq!(scaled.resolution(), Size::from((1920, 1080)));

        let rotated = Output::new(OutputId(1), "B", (1920, 1080).into(), 1., Transform::_90);
        assert_eq!(rotated.resolution(), Size::from((1080, 1920)));
    }

    #[test]
    fn auto_layout_places_right() {
        let mut outputs = Outputs::default();
        outputs.add(output(0, 1920, 1080));
        outputs.add(output(1, 1280, 1024));

        assert_eq!(outputs.get(OutputId(0)).unwrap().rectangle(), rect(0, 0, 1920, 1080));
        assert_eq!(outputs.get(OutputId(1)).unwrap().rectangle(), rect(1920, 0, 1280, 1024));
        assert_eq!(outputs.layout_box(), rect(0, 0, 3200, 1080));
    }

    #[test]
    fn readded_output_replaces_old() {
        let mut outputs = Outputs::default();
        outputs.add(output(0, 1920, 1080));
        outputs.add(output(0, 1280, 720));

        let locations: Vec<_> = outputs.iter().map(|output| output.location).collect();
        assert_eq!(locations, vec![Point::from((0, 0))]);
        assert_eq!(outputs.get(OutputId(0)).unwrap().resolution(), Size::from((1280, 720)));

        outputs.add(output(1, 800, 600));
        assert_eq!(outputs.get(OutputId(1)).unwrap().location, Point::from((1280, 0)));
    }

    #[test]
    fn closest_output() {
        let mut outputs = Outputs::default();
        outputs.add(output(0, 1920, 1080));
        outputs.add(output(1, 1280, 1024));

        let closest = |x: f64, y: f64| outputs.closest(Point::from((x, y))).map(|o| o.id);
        assert_eq!(closest(100., 100.), Some(OutputId(0)));
        assert_eq!(closest(2000., 100.), Some(OutputId(1)));
        assert_eq!(closest(5000., 2000.), Some(OutputId(1)));
        assert_eq!(closest(-50., -50.), Some(OutputId(0)));
    }

    #[test]
    fn usable_area_follows_center() {
        let mut outputs = Outputs::default();
        outputs.add(output(0, 1920, 1080));
        outputs.add(output(1, 1280, 1024));

        assert_eq!(outputs.usable_area(rect(0, 0, 800, 600)), rect(0, 0, 1920, 1080));
        assert_eq!(outputs.usable_area(rect(1800, 0, 800, 600)), rect(0, 0, 1280, 1024));
    }

    #[test]
    fn usable_area_without_outputs() {
        let outputs = Outputs::default();
        assert_eq!(outputs.usable_area(rect(0, 0, 800, 600)), rect(0, 0, 0, 0));
        assert!(outputs.closest(Point::from((0., 0.))).is_none());
    }

    #[test]
    fn clamp_into_layout() {
        let mut outputs = Outputs::default();
        let unclamped = Point::from((-10., 5000.));
        assert_eq!(outputs.clamp(unclamped), unclamped);

        outputs.add(output(0, 1920, 1080));
        let clamped = outputs.clamp(unclamped);
        assert_eq!(clamped.x, 0.);
        assert!(clamped.y < 1080. && clamped.y > 1079.);

        let inside = Point::from((100., 100.));
        assert_eq!(outputs.clamp(inside), inside);
    }

    #[test]
    fn remove_output() {
        let mut outputs = Outputs::default();
        outputs.add(output(0, 1920, 1080));
        assert!(outputs.remove(OutputId(0)).is_some());
        assert!(outputs.remove(OutputId(0)).is_none());
        assert!(outputs.is_empty());
    }
}

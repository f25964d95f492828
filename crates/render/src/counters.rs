use atrium_stats::{CounterReport, RenderCounters};

/// Live render statistics for the frame most recently submitted.
///
/// Draw calls and triangles reset at the start of each frame; the
/// resource counts (geometries, textures, materials) persist until the
/// renderer updates them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounters {
    draw_calls: u32,
    triangles: u64,
    geometries: u32,
    textures: u32,
    materials: u32,
}

impl FrameCounters {
    pub(crate) fn begin_frame(&mut self) {
        self.draw_calls = 0;
        self.triangles = 0;
    }

    pub(crate) fn record_draw(&mut self, triangles: u64) {
        self.draw_calls += 1;
        self.triangles += triangles;
    }

    pub(crate) fn set_resources(&mut self, geometries: u32, textures: u32, materials: u32) {
        self.geometries = geometries;
        self.textures = textures;
        self.materials = materials;
    }

    /// Stable copy of the current readings.
    pub fn report(&self) -> CounterReport {
        CounterReport {
            draw_calls: self.draw_calls,
            triangles: self.triangles,
            geometries: self.geometries,
            textures: self.textures,
            materials: self.materials,
        }
    }
}

impl RenderCounters for FrameCounters {
    fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    fn triangles(&self) -> u64 {
        self.triangles
    }

    fn geometries(&self) -> u32 {
        self.geometries
    }

    fn textures(&self) -> u32 {
        self.textures
    }

    fn materials(&self) -> u32 {
        self.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_frame_resets_per_frame_counts_only() {
        let mut c = FrameCounters::default();
        c.set_resources(3, 1, 7);
        c.record_draw(100);
        c.record_draw(24);
        assert_eq!(c.draw_calls(), 2);
        assert_eq!(c.triangles(), 124);

        c.begin_frame();
        assert_eq!(c.draw_calls(), 0);
        assert_eq!(c.triangles(), 0);
        assert_eq!(c.geometries(), 3);
        assert_eq!(c.materials(), 7);
    }

    #[test]
    fn report_matches_trait_view() {
        let mut c = FrameCounters::default();
        c.set_resources(3, 1, 5);
        c.record_draw(42);
        let report = c.report();
        assert_eq!(report.draw_calls, c.draw_calls());
        assert_eq!(report.triangles, c.triangles());
        assert_eq!(report.geometries, 3);
    }
}

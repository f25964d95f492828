/// Read-only access to a renderer's live per-frame counters.
///
/// The sampler reads these at each window boundary. Every method has a
/// default returning 0 so a backend that does not track some counter can
/// still be sampled; absent counters never become an error.
pub trait RenderCounters {
    /// Draw calls issued for the most recently submitted frame.
    fn draw_calls(&self) -> u32 {
        0
    }

    /// Triangles drawn in the most recently submitted frame.
    fn triangles(&self) -> u64 {
        0
    }

    /// Geometry buffers currently alive on the GPU.
    fn geometries(&self) -> u32 {
        0
    }

    /// Textures currently alive on the GPU.
    fn textures(&self) -> u32 {
        0
    }

    /// Distinct materials used by the current frame.
    fn materials(&self) -> u32 {
        0
    }
}

/// A captured set of counter readings.
///
/// Useful for handing a stable copy of live counters to the sampler when
/// the renderer itself cannot be borrowed across the tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterReport {
    pub draw_calls: u32,
    pub triangles: u64,
    pub geometries: u32,
    pub textures: u32,
    pub materials: u32,
}

impl RenderCounters for CounterReport {
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

    struct BareCounters;
    impl RenderCounters for BareCounters {}

    #[test]
    fn unreported_counters_default_to_zero() {
        let c = BareCounters;
        assert_eq!(c.draw_calls(), 0);
        assert_eq!(c.triangles(), 0);
        assert_eq!(c.geometries(), 0);
        assert_eq!(c.textures(), 0);
        assert_eq!(c.materials(), 0);
    }

    #[test]
    fn report_round_trips_through_trait() {
        let report = CounterReport {
            draw_calls: 7,
            triangles: 1234,
            geometries: 3,
            textures: 1,
            materials: 5,
        };
        assert_eq!(report.draw_calls(), 7);
        assert_eq!(report.triangles(), 1234);
        assert_eq!(report.materials(), 5);
    }
}

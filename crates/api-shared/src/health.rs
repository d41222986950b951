use crate::dto::HealthRes;

/// Health service shared by every API surface.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive.
    ///
    /// Liveness only: the document store is not probed, so a store outage shows up on the
    /// data endpoints as `503` instead.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Clinic service is alive".into(),
        }
    }
}

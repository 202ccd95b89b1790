use crate::{
    api::{attendance, employee},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once so every worker shares the same quota.
#[derive(Clone)]
pub struct Limiters {
    scan: Limiter,
    protected: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            scan: build_limiter(config.rate_scan_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: Limiters) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limiters.protected)
            .service(
                web::scope("/attendance")
                    // /attendance/scan
                    .service(
                        web::resource("/scan")
                            .wrap(limiters.scan)
                            .route(web::post().to(attendance::scan)),
                    )
                    // /attendance/reasons
                    .service(
                        web::resource("/reasons").route(web::post().to(attendance::save_reasons)),
                    )
                    // /attendance/roster
                    .service(web::resource("/roster").route(web::get().to(attendance::roster)))
                    // /attendance/employee/{id}
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(attendance::employee_history)),
                    ),
            )
            .service(
                web::resource("/employees").route(web::get().to(employee::list_employees)),
            ),
    );
}

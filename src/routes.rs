use crate::api::{attendance, employee};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub type RateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
/// `None` when the numbers cannot form a valid quota.
pub fn build_limiter(requests_per_min: u32) -> Option<RateLimit> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };

    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &RateLimit) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limiter))
            .configure(attendance_scopes)
            .configure(employee_scope),
    );
}

pub fn employee_scope(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            // /employees/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::put().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    );
}

/// `/attendance` plus the `/daily-points` paths the existing frontend calls.
pub fn attendance_scopes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/attendance").configure(attendance_routes))
        .service(
            web::scope("/daily-points")
                .configure(attendance_routes)
                // /daily-points/falta/{employee_id}
                .service(
                    web::resource("/falta/{employee_id}")
                        .route(web::put().to(attendance::mark_absence)),
                )
                // /daily-points/falta-manual/{employee_id}
                .service(
                    web::resource("/falta-manual/{employee_id}")
                        .route(web::put().to(attendance::mark_absence)),
                ),
        );
}

fn attendance_routes(cfg: &mut web::ServiceConfig) {
    // ""
    cfg.service(
        web::resource("")
            .route(web::get().to(attendance::list_points))
            .route(web::post().to(attendance::create_point))
            .route(web::delete().to(attendance::delete_points)),
    )
    // /absence/{employee_id}
    .service(
        web::resource("/absence/{employee_id}").route(web::put().to(attendance::mark_absence)),
    )
    // /{id}: GET is keyed by employee, PUT/DELETE by record
    .service(
        web::resource("/{id}")
            .route(web::get().to(attendance::get_point_for_day))
            .route(web::put().to(attendance::update_point))
            .route(web::delete().to(attendance::delete_point)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(1000)]
    #[case(120_000)]
    fn builds_a_quota_for_any_positive_rate(#[case] per_min: u32) {
        assert!(build_limiter(per_min).is_some());
    }

    #[test]
    fn zero_rate_has_no_quota() {
        assert!(build_limiter(0).is_none());
    }
}

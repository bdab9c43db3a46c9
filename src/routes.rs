use crate::{
    api::{
        assignment, attendance, dispute, leave_request, leave_type, location, remote_work, shift,
        shift_change,
    },
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Every route requires a bearer token; the extractor rejects
    // unauthenticated calls, so no separate auth middleware is needed.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/shifts")
                    // /shifts
                    .service(
                        web::resource("")
                            .route(web::post().to(shift::create_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    // /shifts/{id}/deactivate
                    .service(
                        web::resource("/{id}/deactivate")
                            .route(web::put().to(shift::deactivate_shift)),
                    ),
            )
            .service(
                web::scope("/locations")
                    // /locations
                    .service(
                        web::resource("")
                            .route(web::post().to(location::create_location))
                            .route(web::get().to(location::list_locations)),
                    )
                    // /locations/{id}/deactivate
                    .service(
                        web::resource("/{id}/deactivate")
                            .route(web::put().to(location::deactivate_location)),
                    ),
            )
            .service(
                web::scope("/assignments")
                    // /assignments
                    .service(
                        web::resource("")
                            .route(web::post().to(assignment::create_assignments))
                            .route(web::get().to(assignment::list_assignments)),
                    )
                    // /assignments/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(assignment::delete_assignment)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    ),
            )
            .service(
                web::scope("/leave-types").service(
                    web::resource("")
                        .route(web::post().to(leave_type::create_leave_type))
                        .route(web::get().to(leave_type::list_leave_types)),
                ),
            )
            .service(
                web::scope("/leave-balances")
                    .service(web::resource("").route(web::get().to(leave_type::list_leave_balances))),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    // /leave/{id}/recall
                    .service(
                        web::resource("/{id}/recall")
                            .route(web::put().to(leave_request::recall_leave)),
                    )
                    // /leave/{id}/revert
                    .service(
                        web::resource("/{id}/revert")
                            .route(web::put().to(leave_request::revert_leave)),
                    ),
            )
            .service(
                web::scope("/shift-change")
                    .service(
                        web::resource("")
                            .route(web::get().to(shift_change::list_shift_changes))
                            .route(web::post().to(shift_change::create_shift_change)),
                    )
                    .service(
                        web::resource("/{id}/accept")
                            .route(web::put().to(shift_change::accept_shift_change)),
                    )
                    .service(
                        web::resource("/{id}/decline")
                            .route(web::put().to(shift_change::decline_shift_change)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(shift_change::approve_shift_change)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(shift_change::reject_shift_change)),
                    )
                    .service(
                        web::resource("/{id}/recall")
                            .route(web::put().to(shift_change::recall_shift_change)),
                    ),
            )
            .service(
                web::scope("/remote-work")
                    .service(
                        web::resource("")
                            .route(web::get().to(remote_work::list_remote_work))
                            .route(web::post().to(remote_work::create_remote_work)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(remote_work::approve_remote_work)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(remote_work::reject_remote_work)),
                    )
                    .service(
                        web::resource("/{id}/recall")
                            .route(web::put().to(remote_work::recall_remote_work)),
                    ),
            )
            .service(
                web::scope("/disputes")
                    .service(
                        web::resource("")
                            .route(web::get().to(dispute::list_disputes))
                            .route(web::post().to(dispute::create_dispute)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(dispute::approve_dispute)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(dispute::reject_dispute)),
                    ),
            ),
    );
}

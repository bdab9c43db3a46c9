use crate::api::assignment::{AssignmentListResponse, BulkAssign, BulkAssignResponse};
use crate::api::attendance::{CheckInRequest, CheckOutRequest};
use crate::api::dispute::{CreateDispute, DisputeListResponse};
use crate::api::leave_request::{CreateLeave, DecisionNote, LeaveListResponse};
use crate::api::leave_type::CreateLeaveType;
use crate::api::location::CreateLocation;
use crate::api::remote_work::{CreateRemoteWork, RemoteWorkListResponse};
use crate::api::shift::CreateShift;
use crate::api::shift_change::{CreateShiftChange, ShiftChangeListResponse};
use crate::core::workflow::RequestState;
use crate::model::assignment::ShiftAssignment;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::dispute::{Dispute, DisputeType};
use crate::model::leave::{LeaveBalance, LeaveRequest, LeaveType};
use crate::model::location::Location;
use crate::model::remote_work::RemoteWorkRequest;
use crate::model::shift::WorkShift;
use crate::model::shift_change::ShiftChangeRequest;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster & Attendance API",
        version = "1.0.0",
        description = r#"
## Work-shift scheduling & attendance

This API manages shift rosters and the paperwork around them.

### 🔹 Key Features
- **Shift Catalog & Work Sites**
  - Define shift windows and geofenced locations
- **Roster Management**
  - Bulk-assign employees to shifts over date ranges
- **Attendance**
  - Geofenced check-in/out with late detection and a background absence sweep
- **Requests**
  - Leave (with balance ledger), shift swaps, remote work, and attendance disputes

### 🔐 Security
All endpoints are protected using **JWT Bearer authentication**.
Administrative operations require the **Admin** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::deactivate_shift,

        crate::api::location::create_location,
        crate::api::location::list_locations,
        crate::api::location::deactivate_location,

        crate::api::assignment::create_assignments,
        crate::api::assignment::delete_assignment,
        crate::api::assignment::list_assignments,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::list_leave_balances,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::recall_leave,
        crate::api::leave_request::revert_leave,

        crate::api::shift_change::create_shift_change,
        crate::api::shift_change::accept_shift_change,
        crate::api::shift_change::decline_shift_change,
        crate::api::shift_change::approve_shift_change,
        crate::api::shift_change::reject_shift_change,
        crate::api::shift_change::recall_shift_change,
        crate::api::shift_change::list_shift_changes,

        crate::api::remote_work::create_remote_work,
        crate::api::remote_work::approve_remote_work,
        crate::api::remote_work::reject_remote_work,
        crate::api::remote_work::recall_remote_work,
        crate::api::remote_work::list_remote_work,

        crate::api::dispute::create_dispute,
        crate::api::dispute::approve_dispute,
        crate::api::dispute::reject_dispute,
        crate::api::dispute::list_disputes
    ),
    components(
        schemas(
            CreateShift,
            WorkShift,
            CreateLocation,
            Location,
            BulkAssign,
            BulkAssignResponse,
            AssignmentListResponse,
            ShiftAssignment,
            CheckInRequest,
            CheckOutRequest,
            Attendance,
            AttendanceStatus,
            CreateLeaveType,
            LeaveType,
            LeaveBalance,
            CreateLeave,
            DecisionNote,
            LeaveListResponse,
            LeaveRequest,
            RequestState,
            CreateShiftChange,
            ShiftChangeListResponse,
            ShiftChangeRequest,
            CreateRemoteWork,
            RemoteWorkListResponse,
            RemoteWorkRequest,
            CreateDispute,
            DisputeListResponse,
            Dispute,
            DisputeType
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Shifts", description = "Shift catalog APIs"),
        (name = "Locations", description = "Work site & geofence APIs"),
        (name = "Assignments", description = "Roster management APIs"),
        (name = "Attendance", description = "Check-in / check-out APIs"),
        (name = "Leave", description = "Leave types, balances, and requests"),
        (name = "ShiftChange", description = "Shift swap request APIs"),
        (name = "RemoteWork", description = "Remote work request APIs"),
        (name = "Disputes", description = "Attendance dispute APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

use crate::model::room::Room;
use crate::model::sign_event::SignAction;
use crate::models::{LoginReqDto, MessageResponse, RegisterReq, SignReq};
use crate::service::attendance::{AttendanceEntry, CaregiverRef, RoomAttendance};
use crate::service::kids::{CaregiverKid, RoomKidStatus};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sunday School Check-in API",
        version = "1.0.0",
        description = r#"
## Sunday school check-in

Caregivers register their kids and sign them in to and out of rooms.
Teachers see who is currently in each room and print room QR codes.

### Key Features
- **Registration**: one family code per kid, shared between caregivers
- **Sign in / out**: append-only sign log, only for linked caregivers
- **Attendance**: derived from the latest sign event of the day
- **QR codes**: printable codes routing caregivers to a room's sign page

### Security
Attendance and QR endpoints require a teacher session, obtained from
`POST /teacher/login` and carried in the `session` cookie.
"#,
    ),
    paths(
        crate::api::rooms::list_rooms,
        crate::api::register::register,
        crate::api::kids::list_kids,
        crate::api::kids::kids_for_room,
        crate::api::sign::sign,

        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::attendance::attendance_snapshot,
        crate::api::attendance::room_attendance,

        crate::api::qr::room_qr,
        crate::api::qr::room_action_qr
    ),
    components(
        schemas(
            Room,
            SignAction,
            RegisterReq,
            SignReq,
            LoginReqDto,
            MessageResponse,
            CaregiverKid,
            RoomKidStatus,
            CaregiverRef,
            AttendanceEntry,
            RoomAttendance
        )
    ),
    modifiers(&SessionCookie),
    tags(
        (name = "Rooms", description = "Room directory"),
        (name = "Registration", description = "Caregiver and kid registration"),
        (name = "Kids", description = "Caregiver kid lookups"),
        (name = "Sign", description = "Sign in and out"),
        (name = "Teacher", description = "Teacher session"),
        (name = "Attendance", description = "Live room attendance"),
        (name = "QR", description = "Room QR codes"),
    )
)]
pub struct ApiDoc;

struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
        }
    }
}

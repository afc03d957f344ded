//! Room access policy, checked when a connection joins a room

use shared::error::{AppError, ErrorCode};
use shared::models::MemberRole;
use shared::realtime::Room;

use crate::auth::CurrentUser;

/// Staff rooms a member joins with `join-rooms`
pub fn staff_rooms(user: &CurrentUser) -> Vec<Room> {
    let restaurant = user.restaurant_id;
    match user.role {
        MemberRole::Chef => vec![Room::Kitchen(restaurant), Room::Restaurant(restaurant)],
        MemberRole::Owner | MemberRole::Staff => {
            vec![Room::Service(restaurant), Room::Restaurant(restaurant)]
        }
    }
}

/// Whether `user` (None for anonymous) may join `room`
pub fn authorize_join(user: Option<&CurrentUser>, room: Room) -> Result<(), AppError> {
    if room.is_public() {
        return Ok(());
    }
    let Some(user) = user else {
        return Err(AppError::not_authenticated());
    };
    if room.restaurant_id() != Some(user.restaurant_id) {
        return Err(AppError::forbidden(format!("Cannot join room {room}")));
    }
    let allowed = match room {
        Room::Kitchen(_) => user.role.is_kitchen(),
        Room::Service(_) => user.role.is_service(),
        Room::Restaurant(_) | Room::Order(_) | Room::Table(_) => true,
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::RoleRequired,
            format!("Role {} cannot join room {room}", user.role),
        ))
    }
}

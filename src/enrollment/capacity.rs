use crate::models::courses;

/// Whether a course still has a free seat.
///
/// This is the read-side gate only. The seat itself is claimed with a
/// conditional update in [`crate::db::courses::adjust_occupancy`].
pub fn is_available(course: &courses::Model) -> bool {
    course.occupied_seats < course.max_seats
}

pub fn available_seats(course: &courses::Model) -> i32 {
    (course.max_seats - course.occupied_seats).max(0)
}

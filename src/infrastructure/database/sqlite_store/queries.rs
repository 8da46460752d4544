pub(super) const UPSERT_TRIP: &str = r#"
    INSERT OR REPLACE INTO trips (
        id, title, destination, start_date, end_date,
        organiser_id, participant_ids, budget, spent_amount, itinerary
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
"#;

pub(super) const DELETE_TRIP: &str = r#"
    DELETE FROM trips WHERE id = ?1
"#;

pub(super) const SELECT_TRIP_BY_ID: &str = r#"
    SELECT id, title, destination, start_date, end_date,
           organiser_id, participant_ids, budget, spent_amount, itinerary
    FROM trips
    WHERE id = ?1
"#;

pub(super) const SELECT_ALL_TRIPS: &str = r#"
    SELECT id, title, destination, start_date, end_date,
           organiser_id, participant_ids, budget, spent_amount, itinerary
    FROM trips
    ORDER BY start_date ASC, id ASC
"#;

pub(super) const UPSERT_ACTIVITY: &str = r#"
    INSERT OR REPLACE INTO activities (
        id, trip_id, title, date, time, location,
        description, assigned_to, cost, category, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub(super) const DELETE_ACTIVITY: &str = r#"
    DELETE FROM activities WHERE id = ?1
"#;

pub(super) const SELECT_ACTIVITY_BY_ID: &str = r#"
    SELECT id, trip_id, title, date, time, location,
           description, assigned_to, cost, category, created_at
    FROM activities
    WHERE id = ?1
"#;

pub(super) const SELECT_ACTIVITIES_BY_TRIP: &str = r#"
    SELECT id, trip_id, title, date, time, location,
           description, assigned_to, cost, category, created_at
    FROM activities
    WHERE trip_id = ?1
    ORDER BY date ASC, time ASC, id ASC
"#;

pub(super) const UPSERT_MESSAGE: &str = r#"
    INSERT OR REPLACE INTO messages (
        id, trip_id, sender_id, receiver_id, content,
        message_type, timestamp, is_read
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

pub(super) const DELETE_MESSAGE: &str = r#"
    DELETE FROM messages WHERE id = ?1
"#;

pub(super) const SELECT_MESSAGE_BY_ID: &str = r#"
    SELECT id, trip_id, sender_id, receiver_id, content,
           message_type, timestamp, is_read
    FROM messages
    WHERE id = ?1
"#;

pub(super) const SELECT_MESSAGES_BY_TRIP: &str = r#"
    SELECT id, trip_id, sender_id, receiver_id, content,
           message_type, timestamp, is_read
    FROM messages
    WHERE trip_id = ?1
    ORDER BY timestamp ASC, id ASC
"#;

pub(super) const SELECT_PRIVATE_MESSAGES: &str = r#"
    SELECT id, trip_id, sender_id, receiver_id, content,
           message_type, timestamp, is_read
    FROM messages
    WHERE trip_id IS NULL
      AND ((sender_id = ?1 AND receiver_id = ?2)
        OR (sender_id = ?2 AND receiver_id = ?1))
    ORDER BY timestamp ASC, id ASC
"#;

pub(super) const UPSERT_BUDGET_ITEM: &str = r#"
    INSERT OR REPLACE INTO budget_items (
        id, trip_id, title, amount, category,
        paid_by, shared_with, date, description
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub(super) const DELETE_BUDGET_ITEM: &str = r#"
    DELETE FROM budget_items WHERE id = ?1
"#;

pub(super) const SELECT_BUDGET_ITEM_BY_ID: &str = r#"
    SELECT id, trip_id, title, amount, category,
           paid_by, shared_with, date, description
    FROM budget_items
    WHERE id = ?1
"#;

pub(super) const SELECT_BUDGET_ITEMS_BY_TRIP: &str = r#"
    SELECT id, trip_id, title, amount, category,
           paid_by, shared_with, date, description
    FROM budget_items
    WHERE trip_id = ?1
    ORDER BY date ASC, id ASC
"#;

pub(super) const UPSERT_NOTIFICATION: &str = r#"
    INSERT OR REPLACE INTO notifications (
        id, user_id, title, message, notification_type,
        related_trip_id, related_activity_id, timestamp, is_read
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub(super) const DELETE_NOTIFICATION: &str = r#"
    DELETE FROM notifications WHERE id = ?1
"#;

pub(super) const SELECT_NOTIFICATION_BY_ID: &str = r#"
    SELECT id, user_id, title, message, notification_type,
           related_trip_id, related_activity_id, timestamp, is_read
    FROM notifications
    WHERE id = ?1
"#;

pub(super) const SELECT_NOTIFICATIONS_BY_USER: &str = r#"
    SELECT id, user_id, title, message, notification_type,
           related_trip_id, related_activity_id, timestamp, is_read
    FROM notifications
    WHERE user_id = ?1
    ORDER BY timestamp DESC, id ASC
"#;

pub(super) const UPSERT_USER: &str = r#"
    INSERT OR REPLACE INTO users (
        id, email, display_name, role, photo_url, phone
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub(super) const SELECT_USER_BY_ID: &str = r#"
    SELECT id, email, display_name, role, photo_url, phone
    FROM users
    WHERE id = ?1
"#;

pub(super) const SELECT_ALL_USERS: &str = r#"
    SELECT id, email, display_name, role, photo_url, phone
    FROM users
    ORDER BY display_name ASC, id ASC
"#;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::entities::{
    decode, Activity, ActivityCategory, BudgetCategory, BudgetItem, ItineraryEntry, Message,
    MessageType, Notification, NotificationType, Role, Trip, User,
};
use crate::shared::error::AppError;

/// Nested collections are stored as JSON text columns.
pub(super) fn to_json_text<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn parse_string_set(json: &str) -> Vec<String> {
    serde_json::from_str::<Value>(json)
        .map(|value| decode::normalize_string_set(&value))
        .unwrap_or_default()
}

fn parse_itinerary(json: &str) -> Vec<ItineraryEntry> {
    serde_json::from_str::<Value>(json)
        .map(|value| decode::normalize_itinerary(&value))
        .unwrap_or_default()
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| AppError::Decode(format!("invalid date column '{value}': {err}")))
}

pub(super) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(super) fn map_trip_row(row: &SqliteRow) -> Result<Trip, AppError> {
    let participant_ids: String = row.try_get("participant_ids").unwrap_or_default();
    let itinerary: String = row.try_get("itinerary").unwrap_or_default();

    Ok(Trip {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        destination: row.try_get("destination")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        organiser_id: row.try_get("organiser_id")?,
        participant_ids: parse_string_set(&participant_ids),
        budget: row.try_get("budget")?,
        spent_amount: row.try_get("spent_amount")?,
        itinerary: parse_itinerary(&itinerary),
    })
}

pub(super) fn map_activity_row(row: &SqliteRow) -> Result<Activity, AppError> {
    let date: String = row.try_get("date")?;
    let category: String = row.try_get("category").unwrap_or_default();
    let assigned_to: String = row.try_get("assigned_to").unwrap_or_default();

    Ok(Activity {
        id: row.try_get("id")?,
        trip_id: row.try_get("trip_id")?,
        title: row.try_get("title")?,
        date: parse_date(&date)?,
        time: row.try_get("time")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        assigned_to: parse_string_set(&assigned_to),
        cost: row.try_get("cost")?,
        category: ActivityCategory::parse(&category),
        created_at: row.try_get("created_at")?,
    })
}

pub(super) fn map_message_row(row: &SqliteRow) -> Result<Message, AppError> {
    let message_type: String = row.try_get("message_type").unwrap_or_default();

    Ok(Message {
        id: row.try_get("id")?,
        trip_id: row.try_get("trip_id")?,
        sender_id: row.try_get("sender_id")?,
        receiver_id: row.try_get("receiver_id")?,
        content: row.try_get("content")?,
        message_type: MessageType::parse(&message_type),
        timestamp: row.try_get("timestamp")?,
        is_read: row.try_get("is_read")?,
    })
}

pub(super) fn map_budget_item_row(row: &SqliteRow) -> Result<BudgetItem, AppError> {
    let date: String = row.try_get("date")?;
    let category: String = row.try_get("category").unwrap_or_default();
    let shared_with: String = row.try_get("shared_with").unwrap_or_default();

    Ok(BudgetItem {
        id: row.try_get("id")?,
        trip_id: row.try_get("trip_id")?,
        title: row.try_get("title")?,
        amount: row.try_get("amount")?,
        category: BudgetCategory::parse(&category),
        paid_by: row.try_get("paid_by")?,
        shared_with: parse_string_set(&shared_with),
        date: parse_date(&date)?,
        description: row.try_get("description")?,
    })
}

pub(super) fn map_notification_row(row: &SqliteRow) -> Result<Notification, AppError> {
    let notification_type: String = row.try_get("notification_type").unwrap_or_default();

    Ok(Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        notification_type: NotificationType::parse(&notification_type),
        related_trip_id: row.try_get("related_trip_id")?,
        related_activity_id: row.try_get("related_activity_id")?,
        timestamp: row.try_get("timestamp")?,
        is_read: row.try_get("is_read")?,
    })
}

pub(super) fn map_user_row(row: &SqliteRow) -> Result<User, AppError> {
    let role: String = row.try_get("role").unwrap_or_default();

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        role: Role::parse(&role),
        photo_url: row.try_get("photo_url")?,
        phone: row.try_get("phone")?,
    })
}

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Timestamp layout the chat backend writes into `createdAt`.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A chat account as served by the users endpoint.
///
/// `username` + `password` is the login key. Uniqueness is not enforced;
/// lookups take the first match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub avatar: String,
    pub uuid: Uuid,
    pub created_at: String,
}

/// A single chat line between two usernames.
///
/// Equality and hashing cover all five fields so lists can be diffed
/// by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from_user: String,
    pub to_user: String,
    pub message: String,
    pub created_at: String,
}

pub type Users = Vec<User>;
pub type Messages = Vec<Message>;

impl User {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        avatar: impl Into<String>,
        uuid: Uuid,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            password: password.into(),
            name: name.into(),
            avatar: avatar.into(),
            uuid,
            created_at: created_at.into(),
        }
    }

    /// Build a user from a loosely typed JSON object.
    ///
    /// Returns `None` if any field is missing or has the wrong type. The
    /// display name is read from `name`, falling back to the legacy
    /// `firstname` key.
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let name = str_field(map, "name").or_else(|| str_field(map, "firstname"))?;
        Some(Self {
            id: str_field(map, "id")?,
            username: str_field(map, "username")?,
            password: str_field(map, "password")?,
            name,
            avatar: str_field(map, "avatar")?,
            uuid: str_field(map, "uuid")?.parse().ok()?,
            created_at: str_field(map, "createdAt")?,
        })
    }

    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self { id: id.into(), ..self }
    }

    pub fn with_username(self, username: impl Into<String>) -> Self {
        Self { username: username.into(), ..self }
    }

    pub fn with_password(self, password: impl Into<String>) -> Self {
        Self { password: password.into(), ..self }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self }
    }

    pub fn with_avatar(self, avatar: impl Into<String>) -> Self {
        Self { avatar: avatar.into(), ..self }
    }

    pub fn with_uuid(self, uuid: Uuid) -> Self {
        Self { uuid, ..self }
    }

    pub fn with_created_at(self, created_at: impl Into<String>) -> Self {
        Self { created_at: created_at.into(), ..self }
    }
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        from_user: impl Into<String>,
        to_user: impl Into<String>,
        message: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_user: from_user.into(),
            to_user: to_user.into(),
            message: message.into(),
            created_at: created_at.into(),
        }
    }

    /// A message about to be sent: fresh id, current time in wire format.
    pub fn new_outgoing(
        from_user: impl Into<String>,
        to_user: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            Uuid::new_v4().to_string(),
            from_user,
            to_user,
            message,
            Utc::now().format(WIRE_TIMESTAMP_FORMAT).to_string(),
        )
    }

    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: str_field(map, "id")?,
            from_user: str_field(map, "fromUser")?,
            to_user: str_field(map, "toUser")?,
            message: str_field(map, "message")?,
            created_at: str_field(map, "createdAt")?,
        })
    }

    /// The message as a loose JSON object, the shape the store endpoint takes.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("toUser".into(), Value::String(self.to_user.clone()));
        map.insert("message".into(), Value::String(self.message.clone()));
        map.insert("fromUser".into(), Value::String(self.from_user.clone()));
        map.insert("createdAt".into(), Value::String(self.created_at.clone()));
        map
    }

    /// True if this message travels between `a` and `b`, in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.from_user == a && self.to_user == b) || (self.from_user == b && self.to_user == a)
    }

    /// Best-effort parse of `created_at`.
    ///
    /// Accepts RFC 3339 and the backend's naive `YYYY-MM-DD HH:MM:SS.fff`
    /// layout (read as UTC). The stored string is never rewritten.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .parse::<DateTime<Utc>>()
            .or_else(|_| {
                NaiveDateTime::parse_from_str(&self.created_at, WIRE_TIMESTAMP_FORMAT)
                    .map(|ndt| ndt.and_utc())
            })
            .ok()
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self { id: id.into(), ..self }
    }

    pub fn with_from_user(self, from_user: impl Into<String>) -> Self {
        Self { from_user: from_user.into(), ..self }
    }

    pub fn with_to_user(self, to_user: impl Into<String>) -> Self {
        Self { to_user: to_user.into(), ..self }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self { message: message.into(), ..self }
    }

    pub fn with_created_at(self, created_at: impl Into<String>) -> Self {
        Self { created_at: created_at.into(), ..self }
    }
}

/// Collect every entry of a JSON array that forms a valid user; others are skipped.
pub fn users_from_values(values: &[Value]) -> Users {
    values
        .iter()
        .filter_map(Value::as_object)
        .filter_map(User::from_map)
        .collect()
}

pub fn messages_from_values(values: &[Value]) -> Messages {
    values
        .iter()
        .filter_map(Value::as_object)
        .filter_map(Message::from_map)
        .collect()
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn sample_user() -> User {
        User::new(
            "1",
            "Ajs",
            "S@thish25",
            "Ajith",
            "https://example.com/a.png",
            Uuid::nil(),
            "2024-10-08 10:00:00.000",
        )
    }

    #[test]
    fn user_wire_names_are_camel_case() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(value["createdAt"], "2024-10-08 10:00:00.000");
        assert_eq!(value["uuid"], "00000000-0000-0000-0000-000000000000");
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn message_ignores_unknown_wire_fields() {
        let raw = r#"{"id":"7","fromUser":"Ajs","toUser":"A_JS_H","message":"hi",
            "createdAt":"2024-10-09 04:16:53.338","toUserAvatar":"x","fromUserAvatar":"y","uuid":"z"}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.message, "hi");
        assert_eq!(msg.to_user, "A_JS_H");
    }

    #[test]
    fn message_equality_covers_created_at() {
        let a = Message::new("1", "Ajs", "A_JS_H", "hi", "t1");
        let b = a.clone().with_created_at("t2");
        assert_ne!(a, b);

        let set: HashSet<Message> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn with_functions_leave_other_fields() {
        let user = sample_user().with_name("Someone").with_avatar("none");
        assert_eq!(user.name, "Someone");
        assert_eq!(user.avatar, "none");
        assert_eq!(user.username, "Ajs");
        assert_eq!(user.password, "S@thish25");
    }

    #[test]
    fn user_from_map_accepts_legacy_firstname() {
        let value = json!({
            "id": "2", "username": "A_JS_H", "password": "pw", "firstname": "Ajay",
            "avatar": "", "uuid": "9f1c2f0e-3c7a-4a8e-8a51-1f4a2b3c4d5e", "createdAt": "now"
        });
        let user = User::from_map(value.as_object().unwrap()).unwrap();
        assert_eq!(user.name, "Ajay");
    }

    #[test]
    fn from_values_skips_broken_entries() {
        let values = vec![
            json!({"id":"1","fromUser":"a","toUser":"b","message":"m","createdAt":"t"}),
            json!({"id":"2","fromUser":"a"}),
            json!("not an object"),
        ];
        let messages = messages_from_values(&values);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "1");

        let users = users_from_values(&[json!({"id": 3})]);
        assert!(users.is_empty());
    }

    #[test]
    fn to_map_round_trips_through_from_map() {
        let msg = Message::new("1", "Ajs", "A_JS_H", "hello", "t");
        assert_eq!(Message::from_map(&msg.to_map()), Some(msg));
    }

    #[test]
    fn is_between_is_symmetric() {
        let msg = Message::new("1", "Ajs", "A_JS_H", "hello", "t");
        assert!(msg.is_between("Ajs", "A_JS_H"));
        assert!(msg.is_between("A_JS_H", "Ajs"));
        assert!(!msg.is_between("Ajs", "Ajs"));
        assert!(!msg.is_between("Ajs", "someone"));
    }

    #[test]
    fn created_at_parses_wire_and_rfc3339() {
        let wire = Message::new("1", "a", "b", "m", "2024-10-09 04:16:53.338");
        let parsed = wire.created_at_utc().unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 338);

        let rfc = wire.clone().with_created_at("2024-10-09T04:16:53Z");
        assert!(rfc.created_at_utc().is_some());

        let junk = wire.with_created_at("yesterday");
        assert!(junk.created_at_utc().is_none());
    }

    #[test]
    fn outgoing_message_uses_wire_timestamp() {
        let msg = Message::new_outgoing("Ajs", "A_JS_H", "ping");
        assert!(msg.created_at_utc().is_some());
        assert!(Uuid::parse_str(&msg.id).is_ok());
    }
}

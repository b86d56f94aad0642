//! Inbound events, decoded once at the API boundary

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::state::{ChannelId, UserId};

/// What a panel button does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    Start,
    Complete,
}

/// Whether the panel had any timers when the button was rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonScope {
    Any,
    Unassigned,
}

/// Panel button identity, e.g. `start_any` or `complete_unassigned`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonAction {
    pub kind: ButtonKind,
    pub scope: ButtonScope,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown button id: {0}")]
pub struct UnknownButton(pub String);

impl FromStr for ButtonAction {
    type Err = UnknownButton;

    fn from_str(custom_id: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownButton(custom_id.to_string());
        let (kind, scope) = custom_id.split_once('_').ok_or_else(unknown)?;

        let kind = match kind {
            "start" => ButtonKind::Start,
            "complete" => ButtonKind::Complete,
            _ => return Err(unknown()),
        };
        let scope = match scope {
            "any" => ButtonScope::Any,
            "unassigned" => ButtonScope::Unassigned,
            _ => return Err(unknown()),
        };
        Ok(Self { kind, scope })
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ButtonKind::Start => "start",
            ButtonKind::Complete => "complete",
        };
        let scope = match self.scope {
            ButtonScope::Any => "any",
            ButtonScope::Unassigned => "unassigned",
        };
        write!(f, "{}_{}", kind, scope)
    }
}

/// Admin-gated slash commands
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Bind the panel to a channel and render it
    Panel {
        requester: UserId,
        channel: ChannelId,
    },
    /// Assign a timer to a freelancer and link their private channel
    Assign {
        requester: UserId,
        freelancer: UserId,
        hours: f64,
        #[serde(default)]
        minutes: f64,
        private_channel: ChannelId,
    },
}

/// Owner-gated timer actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    Start { requester: UserId, owner: UserId },
    Complete { requester: UserId, owner: UserId },
}

impl TimerAction {
    /// Button clicks always act on the clicking user's own timer
    pub fn from_button(kind: ButtonKind, user: UserId) -> Self {
        match kind {
            ButtonKind::Start => TimerAction::Start {
                requester: user.clone(),
                owner: user,
            },
            ButtonKind::Complete => TimerAction::Complete {
                requester: user.clone(),
                owner: user,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("start_any", ButtonKind::Start, ButtonScope::Any)]
    #[case("complete_any", ButtonKind::Complete, ButtonScope::Any)]
    #[case("start_unassigned", ButtonKind::Start, ButtonScope::Unassigned)]
    #[case("complete_unassigned", ButtonKind::Complete, ButtonScope::Unassigned)]
    fn test_parse_button(
        #[case] custom_id: &str,
        #[case] kind: ButtonKind,
        #[case] scope: ButtonScope,
    ) {
        let action: ButtonAction = custom_id.parse().unwrap();
        assert_eq!(action, ButtonAction { kind, scope });
        assert_eq!(action.to_string(), custom_id);
    }

    #[rstest]
    #[case("")]
    #[case("start")]
    #[case("stop_any")]
    #[case("start_someone")]
    fn test_parse_unknown_button(#[case] custom_id: &str) {
        assert!(custom_id.parse::<ButtonAction>().is_err());
    }

    #[test]
    fn test_decode_assign_command() {
        let command: Command = serde_json::from_str(
            r#"{"command":"assign","requester":"admin","freelancer":"U","hours":1,"private_channel":"C"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::Assign {
                requester: UserId::new("admin"),
                freelancer: UserId::new("U"),
                hours: 1.0,
                minutes: 0.0,
                private_channel: ChannelId::new("C"),
            }
        );
    }

    #[test]
    fn test_button_acts_on_own_timer() {
        let action = TimerAction::from_button(ButtonKind::Complete, UserId::new("U"));
        assert_eq!(
            action,
            TimerAction::Complete {
                requester: UserId::new("U"),
                owner: UserId::new("U"),
            }
        );
    }
}

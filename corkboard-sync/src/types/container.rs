//! Container addressing.
//!
//! A container is an ordered bag of items: a list's cards, a board's lists,
//! or a user's personal inbox. The key is the composite address every cache
//! and every authoritative code path uses, so a logical container always
//! maps to exactly one cache entry.

use super::ids::{BoardId, ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Composite key addressing one ordered container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerKey {
    /// The ordered lists of a board
    BoardLists { board: BoardId },
    /// The ordered cards of a list (the board scopes event delivery)
    ListCards { board: BoardId, list: ItemId },
    /// A user's personal inbox of cards
    Inbox { user: UserId },
}

impl ContainerKey {
    pub fn board_lists(board: impl Into<BoardId>) -> Self {
        Self::BoardLists {
            board: board.into(),
        }
    }

    pub fn list_cards(board: impl Into<BoardId>, list: impl Into<ItemId>) -> Self {
        Self::ListCards {
            board: board.into(),
            list: list.into(),
        }
    }

    pub fn inbox(user: impl Into<UserId>) -> Self {
        Self::Inbox { user: user.into() }
    }

    /// The event channel this container's mutations are delivered on.
    ///
    /// Board-owned containers share their board's channel; inboxes get a
    /// per-user channel so a participant can follow their own inbox without
    /// subscribing to any board.
    pub fn channel(&self) -> ChannelKey {
        match self {
            Self::BoardLists { board } | Self::ListCards { board, .. } => {
                ChannelKey::Board(board.clone())
            }
            Self::Inbox { user } => ChannelKey::User(user.clone()),
        }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardLists { board } => write!(f, "board:{}", board),
            Self::ListCards { board, list } => write!(f, "list:{}/{}", board, list),
            Self::Inbox { user } => write!(f, "inbox:{}", user),
        }
    }
}

impl FromStr for ContainerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("malformed container key: {}", s))?;
        match kind {
            "board" => Ok(Self::board_lists(rest)),
            "list" => {
                let (board, list) = rest
                    .split_once('/')
                    .ok_or_else(|| format!("malformed list key: {}", s))?;
                Ok(Self::list_cards(board, list))
            }
            "inbox" => Ok(Self::inbox(rest)),
            other => Err(format!("unknown container kind: {}", other)),
        }
    }
}

/// Key of an event-relay channel (see [`ContainerKey::channel`]).
/// In-process only; containers, not channels, are the wire-level address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    Board(BoardId),
    User(UserId),
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(board) => write!(f, "board:{}", board),
            Self::User(user) => write!(f, "user:{}", user),
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Governance module messages.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{require, Coin, Message, MessageFactory};
use crate::error::WalletError;

/// Plain text proposal body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextProposal {
    pub title: String,
    pub description: String,
}

/// Proposal content, tagged with its own type URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "typeUrl", content = "value")]
pub enum ProposalContent {
    #[serde(rename = "/cosmos.gov.v1beta1.TextProposal")]
    Text(TextProposal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgSubmitProposal {
    pub content: ProposalContent,
    pub initial_deposit: Vec<Coin>,
    pub proposer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgDeposit {
    pub proposal_id: u64,
    pub depositor: String,
    pub amount: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVote {
    pub proposal_id: u64,
    pub voter: String,
    pub option: VoteOption,
}

/// Vote choice, encoded on the wire by its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum VoteOption {
    Yes,
    Abstain,
    No,
    NoWithVeto,
}

impl VoteOption {
    pub fn code(self) -> i32 {
        match self {
            VoteOption::Yes => 1,
            VoteOption::Abstain => 2,
            VoteOption::No => 3,
            VoteOption::NoWithVeto => 4,
        }
    }
}

impl From<VoteOption> for i32 {
    fn from(option: VoteOption) -> Self {
        option.code()
    }
}

impl TryFrom<i32> for VoteOption {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(VoteOption::Yes),
            2 => Ok(VoteOption::Abstain),
            3 => Ok(VoteOption::No),
            4 => Ok(VoteOption::NoWithVeto),
            other => Err(format!("unknown vote option {other}")),
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoteOption::Yes => "yes",
            VoteOption::Abstain => "abstain",
            VoteOption::No => "no",
            VoteOption::NoWithVeto => "no_with_veto",
        };
        f.write_str(label)
    }
}

impl MessageFactory {
    /// Submit a text proposal with an initial deposit in display tokens.
    ///
    /// A zero initial deposit is allowed; the chain decides whether the
    /// proposal enters the voting period.
    pub fn submit_proposal(
        &self,
        proposer: &str,
        title: &str,
        description: &str,
        initial_deposit: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::SubmitProposal(MsgSubmitProposal {
            content: ProposalContent::Text(TextProposal {
                title: require("proposal title", title)?,
                description: description.to_string(),
            }),
            initial_deposit: vec![self.coin(initial_deposit)?],
            proposer: require("proposer address", proposer)?,
        }))
    }

    pub fn deposit(
        &self,
        depositor: &str,
        proposal_id: u64,
        amount: &str,
    ) -> Result<Message, WalletError> {
        Ok(Message::Deposit(MsgDeposit {
            proposal_id,
            depositor: require("depositor address", depositor)?,
            amount: vec![self.positive_coin("deposit amount", amount)?],
        }))
    }

    pub fn vote(
        &self,
        voter: &str,
        proposal_id: u64,
        option: VoteOption,
    ) -> Result<Message, WalletError> {
        Ok(Message::Vote(MsgVote {
            proposal_id,
            voter: require("voter address", voter)?,
            option,
        }))
    }
}

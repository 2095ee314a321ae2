//! In-memory poll records and every operation that reads or mutates them.
//!
//! A [`PollStore`] is a cloneable handle: all clones share one map and one id
//! counter behind a single mutex, so each operation is atomic with respect to
//! every other one.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub type PollId = u64;

pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub logo: Option<String>,
    pub options: Vec<PollOption>,
    #[serde(rename = "votedIPs")]
    pub voted_ips: Vec<String>,
}

impl Poll {
    pub fn has_voted(&self, ip: &str) -> bool {
        self.voted_ips.iter().any(|voted| voted == ip)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOption {
    pub text: String,
    pub image: Option<String>,
    pub votes: u64,
}

/// Input of [`PollStore::create_poll`]. Image references are paired with
/// option texts by position; missing trailing entries mean "no image".
#[derive(Debug, Clone, Default)]
pub struct NewPoll {
    pub question: String,
    pub option_texts: Vec<String>,
    pub logo: Option<String>,
    pub option_images: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct PollEdit {
    pub question: String,
    pub option_texts: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Poll not found.")]
    NotFound,

    #[error("You have already voted on this poll.")]
    DuplicateVote,

    #[error("Invalid option.")]
    InvalidOption,
}

pub const MISSING_FIELDS: &str = "Question and at least two options are required.";

/// Checks the creation preconditions without touching any store.
pub fn validate_new_poll(question: &str, option_texts: &[String]) -> Result<(), PollError> {
    if question.trim().is_empty() || option_texts.len() < MIN_OPTIONS {
        return Err(PollError::Validation(MISSING_FIELDS));
    }

    if option_texts.iter().any(|text| text.trim().is_empty()) {
        return Err(PollError::Validation("Options must not be empty."));
    }

    Ok(())
}

#[derive(Default)]
struct Polls {
    by_id: BTreeMap<PollId, Poll>,
    last_id: PollId,
}

#[derive(Clone, Default)]
pub struct PollStore {
    inner: Arc<Mutex<Polls>>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every operation finishes its mutation before the guard drops, so a
    // poisoned lock still holds consistent data.
    fn polls(&self) -> MutexGuard<'_, Polls> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_poll(&self, new: NewPoll) -> Result<Poll, PollError> {
        validate_new_poll(&new.question, &new.option_texts)?;

        let mut images = new.option_images.into_iter();
        let options = new
            .option_texts
            .into_iter()
            .map(|text| PollOption {
                text,
                image: images.next().flatten(),
                votes: 0,
            })
            .collect();

        let mut polls = self.polls();
        polls.last_id += 1;
        let poll = Poll {
            id: polls.last_id,
            question: new.question,
            logo: new.logo,
            options,
            voted_ips: Vec::new(),
        };
        polls.by_id.insert(poll.id, poll.clone());

        info!(poll_id = poll.id, options = poll.options.len(), "poll created");
        Ok(poll)
    }

    pub fn get_poll(&self, id: PollId) -> Result<Poll, PollError> {
        self.polls().by_id.get(&id).cloned().ok_or(PollError::NotFound)
    }

    /// All polls in creation order.
    pub fn list_polls(&self) -> Vec<Poll> {
        self.polls().by_id.values().cloned().collect()
    }

    /// Records one vote from `voter_ip`. `option_index` is `None` when the
    /// caller could not decode any index; that is rejected as an invalid
    /// option, but only after the duplicate check.
    pub fn vote(
        &self,
        id: PollId,
        option_index: Option<usize>,
        voter_ip: &str,
    ) -> Result<Poll, PollError> {
        let mut polls = self.polls();
        let poll = polls.by_id.get_mut(&id).ok_or(PollError::NotFound)?;

        if poll.has_voted(voter_ip) {
            return Err(PollError::DuplicateVote);
        }

        let option = option_index
            .and_then(|index| poll.options.get_mut(index))
            .ok_or(PollError::InvalidOption)?;
        option.votes += 1;
        poll.voted_ips.push(voter_ip.to_owned());

        info!(poll_id = id, option = ?option_index, "vote accepted");
        Ok(poll.clone())
    }

    /// Replaces the question and option texts in place. Votes follow the
    /// option index, images are cleared.
    pub fn edit_poll(&self, id: PollId, edit: PollEdit) -> Result<Poll, PollError> {
        let mut polls = self.polls();
        let poll = polls.by_id.get_mut(&id).ok_or(PollError::NotFound)?;

        if edit.option_texts.len() < MIN_OPTIONS {
            warn!(
                poll_id = id,
                options = edit.option_texts.len(),
                "poll edited below minimum option count"
            );
        }

        let options = edit
            .option_texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| PollOption {
                text,
                image: None,
                votes: poll.options.get(index).map_or(0, |old| old.votes),
            })
            .collect();

        poll.question = edit.question;
        poll.options = options;

        info!(poll_id = id, options = poll.options.len(), "poll edited");
        Ok(poll.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn edit(question: &str, options: &[&str]) -> PollEdit {
        PollEdit {
            question: question.to_owned(),
            option_texts: texts(options),
        }
    }

    fn create(store: &PollStore, question: &str, options: &[&str]) -> Result<Poll, PollError> {
        store.create_poll(NewPoll {
            question: question.to_owned(),
            option_texts: texts(options),
            ..Default::default()
        })
    }

    #[test]
    fn create_builds_zeroed_options_with_increasing_ids() {
        let store = PollStore::new();

        let first = create(&store, "Lunch?", &["Pizza", "Sushi", "Tacos"]).unwrap();
        let second = create(&store, "Dinner?", &["Soup", "Salad"]).unwrap();

        assert_eq!(first.id, 1);
        assert!(second.id > first.id);
        assert_eq!(first.options.len(), 3);
        assert!(first.options.iter().all(|option| option.votes == 0));
        assert!(first.voted_ips.is_empty());
        assert_eq!(first.logo, None);
    }

    #[test]
    fn create_pairs_images_by_position() {
        let store = PollStore::new();
        let poll = store
            .create_poll(NewPoll {
                question: "Pet?".to_owned(),
                option_texts: texts(&["Cat", "Dog", "Fish"]),
                logo: Some("/uploads/logo.png".to_owned()),
                option_images: vec![Some("/uploads/cat.png".to_owned()), None],
            })
            .unwrap();

        assert_eq!(poll.logo.as_deref(), Some("/uploads/logo.png"));
        assert_eq!(poll.options[0].image.as_deref(), Some("/uploads/cat.png"));
        assert_eq!(poll.options[1].image, None);
        assert_eq!(poll.options[2].image, None);
    }

    #[test]
    fn invalid_creation_leaves_store_untouched() {
        let store = PollStore::new();

        assert_eq!(
            create(&store, "", &["A", "B"]),
            Err(PollError::Validation(MISSING_FIELDS))
        );
        assert_eq!(
            create(&store, "Only one?", &["A"]),
            Err(PollError::Validation(MISSING_FIELDS))
        );
        assert!(matches!(
            create(&store, "Blank option?", &["A", "  "]),
            Err(PollError::Validation(_))
        ));
        assert!(store.list_polls().is_empty());

        // failed attempts do not consume ids
        assert_eq!(create(&store, "Now?", &["Yes", "No"]).unwrap().id, 1);
    }

    #[test]
    fn duplicate_vote_is_rejected_without_mutation() {
        let store = PollStore::new();
        let poll = create(&store, "Tabs?", &["Tabs", "Spaces"]).unwrap();

        let voted = store.vote(poll.id, Some(0), "10.0.0.1").unwrap();
        assert_eq!(voted.options[0].votes, 1);
        assert_eq!(voted.voted_ips, vec!["10.0.0.1"]);

        assert_eq!(store.vote(poll.id, Some(1), "10.0.0.1"), Err(PollError::DuplicateVote));
        assert_eq!(store.get_poll(poll.id).unwrap(), voted);
    }

    #[test]
    fn duplicate_check_precedes_option_check() {
        let store = PollStore::new();
        let poll = create(&store, "Tabs?", &["Tabs", "Spaces"]).unwrap();
        store.vote(poll.id, Some(1), "10.0.0.1").unwrap();

        assert_eq!(store.vote(poll.id, Some(9), "10.0.0.1"), Err(PollError::DuplicateVote));
        assert_eq!(store.vote(poll.id, None, "10.0.0.1"), Err(PollError::DuplicateVote));
    }

    #[test]
    fn out_of_range_vote_changes_nothing() {
        let store = PollStore::new();
        let poll = create(&store, "Tabs?", &["Tabs", "Spaces"]).unwrap();

        assert_eq!(store.vote(poll.id, Some(2), "10.0.0.1"), Err(PollError::InvalidOption));
        assert_eq!(store.vote(poll.id, None, "10.0.0.1"), Err(PollError::InvalidOption));
        assert_eq!(store.get_poll(poll.id).unwrap(), poll);

        // the rejected voter may still vote properly
        assert!(store.vote(poll.id, Some(1), "10.0.0.1").is_ok());
    }

    #[test]
    fn unknown_poll_is_not_found() {
        let store = PollStore::new();

        assert_eq!(store.get_poll(7), Err(PollError::NotFound));
        assert_eq!(store.vote(7, Some(0), "10.0.0.1"), Err(PollError::NotFound));
        assert_eq!(store.edit_poll(7, edit("Q", &["A", "B"])), Err(PollError::NotFound));
    }

    fn poll_with_votes(store: &PollStore, votes: &[usize]) -> Poll {
        let poll = create(store, "Best letter?", &["A", "B"]).unwrap();
        for (voter, &index) in votes.iter().enumerate() {
            store.vote(poll.id, Some(index), &format!("10.0.0.{voter}")).unwrap();
        }
        store.get_poll(poll.id).unwrap()
    }

    #[test]
    fn edit_keeps_votes_by_index() {
        let store = PollStore::new();
        let poll = poll_with_votes(&store, &[0, 0, 0, 0, 0, 1, 1, 1]);

        let edited = store
            .edit_poll(poll.id, edit("Best letter now?", &["A2", "B2"]))
            .unwrap();

        assert_eq!(edited.question, "Best letter now?");
        let summary: Vec<(&str, u64)> = edited
            .options
            .iter()
            .map(|option| (option.text.as_str(), option.votes))
            .collect();
        assert_eq!(summary, vec![("A2", 5), ("B2", 3)]);
        assert_eq!(edited.voted_ips, poll.voted_ips);
    }

    #[test]
    fn edit_shrinks_and_grows_options() {
        let store = PollStore::new();
        let poll = poll_with_votes(&store, &[0, 1, 1]);

        let shrunk = store.edit_poll(poll.id, edit("Q", &["A"])).unwrap();
        assert_eq!(shrunk.options.len(), 1);
        assert_eq!(shrunk.options[0].votes, 1);

        let grown = store.edit_poll(poll.id, edit("Q", &["A", "B", "C"])).unwrap();
        let votes: Vec<u64> = grown.options.iter().map(|option| option.votes).collect();
        assert_eq!(votes, vec![1, 0, 0]);
    }

    #[test]
    fn edit_clears_images() {
        let store = PollStore::new();
        let poll = store
            .create_poll(NewPoll {
                question: "Pet?".to_owned(),
                option_texts: texts(&["Cat", "Dog"]),
                logo: Some("logo".to_owned()),
                option_images: vec![Some("cat".to_owned()), Some("dog".to_owned())],
            })
            .unwrap();

        let edited = store.edit_poll(poll.id, edit("Pet?", &["Cat", "Dog"])).unwrap();

        assert!(edited.options.iter().all(|option| option.image.is_none()));
        assert_eq!(edited.logo.as_deref(), Some("logo"));
    }

    #[test]
    fn reads_are_pure() {
        let store = PollStore::new();
        poll_with_votes(&store, &[1]);
        create(&store, "Second?", &["X", "Y"]).unwrap();

        let listed = store.list_polls();
        assert_eq!(store.list_polls(), listed);
        assert_eq!(store.get_poll(1).unwrap(), store.get_poll(1).unwrap());
        assert_eq!(listed.iter().map(|poll| poll.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn favorite_color_scenario() {
        let store = PollStore::new();

        let poll = create(&store, "Favorite color?", &["Red", "Blue"]).unwrap();
        assert_eq!(poll.id, 1);
        assert!(poll.options.iter().all(|option| option.votes == 0));

        let poll = store.vote(1, Some(1), "1.2.3.4").unwrap();
        assert_eq!(poll.options[1].votes, 1);
        assert_eq!(poll.voted_ips, vec!["1.2.3.4"]);

        assert_eq!(store.vote(1, Some(1), "1.2.3.4"), Err(PollError::DuplicateVote));

        let poll = store.vote(1, Some(1), "5.6.7.8").unwrap();
        assert_eq!(poll.options[1].votes, 2);
    }

    #[test]
    fn concurrent_votes_from_one_ip_count_once() {
        let store = PollStore::new();
        let poll = create(&store, "Race?", &["A", "B"]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.vote(poll.id, Some(0), "9.9.9.9").is_ok())
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);

        let poll = store.get_poll(poll.id).unwrap();
        assert_eq!(poll.options[0].votes, 1);
        assert_eq!(poll.voted_ips.len(), 1);
    }
}

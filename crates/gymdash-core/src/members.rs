//! Member directory types and roster filtering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MembershipStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    pub status: MembershipStatus,
}

/// Roster filter used when picking members for an assignment.
///
/// The search text matches name or email ignoring case, or appears verbatim
/// in the phone number. A blank search matches everyone.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub search: String,
    pub status: Option<MembershipStatus>,
}

impl MemberFilter {
    pub fn matches(&self, member: &Member) -> bool {
        if self.status.is_some_and(|s| s != member.status) {
            return false;
        }
        let needle = self.search.trim();
        if needle.is_empty() {
            return true;
        }
        let lower = needle.to_lowercase();
        member.name.to_lowercase().contains(&lower)
            || member.email.to_lowercase().contains(&lower)
            || member.phone.contains(needle)
    }

    pub fn apply<'a>(&self, members: &'a [Member]) -> Vec<&'a Member> {
        members.iter().filter(|m| self.matches(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, email: &str, phone: &str, status: MembershipStatus) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            photo: None,
            status,
        }
    }

    #[test]
    fn search_covers_name_email_and_phone() {
        let roster = vec![
            member("Ana Diaz", "ana@gym.io", "555-0101", MembershipStatus::Active),
            member("Ben Okafor", "BEN@gym.io", "555-0199", MembershipStatus::Trial),
            member("Chloe Ng", "chloe@gym.io", "555-0123", MembershipStatus::Expired),
        ];

        let by_name = MemberFilter {
            search: "diaz".into(),
            status: None,
        };
        assert_eq!(by_name.apply(&roster).len(), 1);

        let by_email = MemberFilter {
            search: "ben@".into(),
            status: None,
        };
        assert_eq!(by_email.apply(&roster)[0].name, "Ben Okafor");

        let by_phone = MemberFilter {
            search: "0123".into(),
            status: None,
        };
        assert_eq!(by_phone.apply(&roster)[0].name, "Chloe Ng");
    }

    #[test]
    fn status_filter_combines_with_search() {
        let roster = vec![
            member("Ana Diaz", "ana@gym.io", "1", MembershipStatus::Active),
            member("Ana Silva", "silva@gym.io", "2", MembershipStatus::Expired),
        ];
        let filter = MemberFilter {
            search: "ana".into(),
            status: Some(MembershipStatus::Expired),
        };
        let hits = filter.apply(&roster);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ana Silva");
        assert_eq!(MemberFilter::default().apply(&roster).len(), 2);
    }
}

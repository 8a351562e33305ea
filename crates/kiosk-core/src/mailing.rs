//! Mailing-list integration: the contact payload, list routing and the
//! [`MailingList`] trait implemented by the server's Brevo client.

use std::{collections::BTreeMap, collections::HashMap, future::Future};

use serde::{Deserialize, Serialize};

use crate::draft::Draft;

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A contact as handed to the mailing-list provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
  pub email:      String,
  /// Provider attribute name (`FIRSTNAME`, `KID1_DOB`, …) → value.
  pub attributes: BTreeMap<String, String>,
  pub list_ids:   Vec<i64>,
}

impl NewContact {
  /// Build the provider payload for an accepted draft.
  ///
  /// Every guardian attribute is always present (empty string when not
  /// given). Children contribute `KID<n>_*` attributes, numbered from 1.
  pub fn from_draft(draft: &Draft, list_id: i64) -> Self {
    let mut attributes = BTreeMap::new();
    let mut put = |k: &str, v: &str| {
      attributes.insert(k.to_owned(), v.to_owned());
    };

    put("FIRSTNAME", &draft.first_name);
    put("LASTNAME", &draft.last_name);
    put("DOB", &draft.dob);
    put("PHONENUMBER", &draft.phone);
    put("STREET", &draft.street);
    put("POSTCODE", &draft.postal_code);
    put("CITY", &draft.city);
    put("PROVINCE", &draft.province);
    put("COUNTRY", &draft.country);
    put("SIGNATURE", &draft.signature);

    for (i, child) in draft.children.iter().enumerate() {
      let n = i + 1;
      put(&format!("KID{n}_FIRSTNAME"), &child.first_name);
      put(&format!("KID{n}_LASTNAME"), &child.last_name);
      put(&format!("KID{n}_GENDER"), child.gender.as_str());
      put(&format!("KID{n}_DOB"), &child.dob);
    }

    NewContact {
      email: draft.email.trim().to_owned(),
      attributes,
      list_ids: vec![list_id],
    }
  }
}

// ─── Routing ─────────────────────────────────────────────────────────────────

/// Which list a branch's contacts go to.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRouting {
  /// List used for any branch without an explicit entry.
  pub default_list_id: i64,
  /// Branch code (upper-case) → list id.
  #[serde(default)]
  pub branches:        HashMap<String, i64>,
}

impl Default for ListRouting {
  fn default() -> Self {
    Self {
      default_list_id: 6,
      branches:        HashMap::from([("PD".to_owned(), 5)]),
    }
  }
}

impl ListRouting {
  pub fn list_for(&self, branch_code: &str) -> i64 {
    self
      .branches
      .iter()
      .find(|(code, _)| code.eq_ignore_ascii_case(branch_code))
      .map(|(_, id)| *id)
      .unwrap_or(self.default_list_id)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// An external contact-list provider.
pub trait MailingList: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create (or update) `contact` and add it to its lists.
  fn add_contact(
    &self,
    contact: NewContact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

use async_trait::async_trait;
use indicatif::ProgressBar;
use reviewmeta::cli::contributors::update_contributors;
use reviewmeta::cli::review_teams::update_review_teams;
use reviewmeta::github::{AcceptAllLinks, ContributorSource, GitHubError, ProfileLookup};
use reviewmeta::models::{ReviewRecord, ReviewUser, Team, UserProfile};
use reviewmeta::roster::{contributor_source_url, Roster};
use reviewmeta::store::{load_roster, save_roster};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

struct FakeSources {
    listings: HashMap<String, Vec<String>>,
}

#[async_trait]
impl ContributorSource for FakeSources {
    async fn contributor_logins(&self, url: &str) -> Result<Vec<String>, GitHubError> {
        self.listings
            .get(url)
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(url.to_string()))
    }
}

#[derive(Default)]
struct FakeProfiles {
    calls: AtomicUsize,
    unauthorized: bool,
}

#[async_trait]
impl ProfileLookup for FakeProfiles {
    async fn get_user_info(&self, handle: &str) -> Result<UserProfile, GitHubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unauthorized {
            return Err(GitHubError::Unauthorized);
        }
        Ok(UserProfile {
            login: handle.to_string(),
            id: Some(1000),
            name: Some(format!("GitHub {}", handle)),
            mastodon_username: Some(format!("@{}@mastodon.social", handle)),
            ..Default::default()
        })
    }
}

const ROSTER_YAML: &str = "- name: Leah Wasser
  github_username: lwasser
  github_image_id: 7649194
  mastodon: '@leahawasser@fosstodon.org'
  contributor_type:
  - eic
  - web-contrib
  packages_editor:
  - pandera
  date_added: '2022-01-01'
  board: true
- name: ''
  github_username: Cmarmo
  contributor_type: []
";

fn url(repo: &str) -> String {
    contributor_source_url("pyOpenSci", repo, "main")
}

fn sources() -> FakeSources {
    let mut listings = HashMap::new();
    listings.insert(url("pyosmeta"), vec!["lwasser".to_string(), "newbie".to_string()]);
    listings.insert(url("handbook"), vec!["NEWBIE".to_string(), "cmarmo".to_string()]);
    FakeSources { listings }
}

fn sunpy_record() -> ReviewRecord {
    serde_yaml::from_str(
        "package_name: SunPy
repository_link: https://github.com/sunpy/sunpy
submitting_author:
  name: Nabil Freij
  github_username: nabobalis
all_current_maintainers:
  name: ''
  github_username: nabobalis
editor:
  name: ''
  github_username: CMarmo
eic:
  name: ''
  github_username: lwasser
reviewers:
- name: ''
  github_username: lwasser
created_at: 2023-10-30T18:45:06Z
updated_at: 2024-02-22T01:24:31Z
",
    )
    .unwrap()
}

fn write_roster(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("contributors.yml");
    std::fs::write(&path, ROSTER_YAML).unwrap();
    path
}

#[tokio::test]
async fn test_update_contributors_twice_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    let mut roster = load_roster(&path).unwrap();
    let urls = vec![url("pyosmeta"), url("handbook"), url("does-not-exist")];
    let profiles = FakeProfiles::default();

    let report = update_contributors(&mut roster, &urls, &sources(), &profiles, &AcceptAllLinks, false)
        .await
        .unwrap();
    assert_eq!(report.added, vec!["newbie".to_string()]);
    assert_eq!(profiles.calls.load(Ordering::SeqCst), 1);

    save_roster(&path, &roster).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();

    let mut again = load_roster(&path).unwrap();
    let report = update_contributors(&mut again, &urls, &sources(), &profiles, &AcceptAllLinks, false)
        .await
        .unwrap();
    assert!(report.added.is_empty());
    save_roster(&path, &again).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

    let newbie = again.get("newbie").unwrap();
    assert_eq!(
        newbie.contributor_type.iter().collect::<Vec<_>>(),
        vec!["code-contrib", "community"]
    );
    assert_eq!(newbie.mastodon.as_deref(), Some("@newbie@mastodon.social"));
    assert!(first.contains("board: true"));
}

#[tokio::test]
async fn test_refresh_preserves_name_and_mastodon() {
    let dir = TempDir::new().unwrap();
    let mut roster = load_roster(&write_roster(&dir)).unwrap();
    let profiles = FakeProfiles::default();

    update_contributors(&mut roster, &[], &sources(), &profiles, &AcceptAllLinks, true)
        .await
        .unwrap();

    let leah = roster.get("LWasser").unwrap();
    assert_eq!(leah.name.as_deref(), Some("Leah Wasser"));
    assert_eq!(leah.mastodon.as_deref(), Some("@leahawasser@fosstodon.org"));
    assert_eq!(leah.github_image_id, Some(1000));

    let cmarmo = roster.get("cmarmo").unwrap();
    assert_eq!(cmarmo.name.as_deref(), Some("GitHub Cmarmo"));
    assert_eq!(cmarmo.mastodon, None);
}

#[tokio::test]
async fn test_unauthorized_lookup_aborts() {
    let mut roster = Roster::new();
    let profiles = FakeProfiles {
        unauthorized: true,
        ..Default::default()
    };
    let result = update_contributors(
        &mut roster,
        &[url("pyosmeta")],
        &sources(),
        &profiles,
        &AcceptAllLinks,
        false,
    )
    .await;
    assert!(matches!(result, Err(GitHubError::Unauthorized)));
    assert_eq!(profiles.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_review_teams_credit_and_backfill() {
    let dir = TempDir::new().unwrap();
    let mut roster = load_roster(&write_roster(&dir)).unwrap();
    let profiles = FakeProfiles::default();
    let mut records = vec![sunpy_record()];

    let report = update_review_teams(
        &mut roster,
        &mut records,
        &profiles,
        &AcceptAllLinks,
        &ProgressBar::hidden(),
    )
    .await
    .unwrap();
    assert_eq!(report.added, vec!["nabobalis".to_string()]);

    let once = roster.clone();
    update_review_teams(
        &mut roster,
        &mut records,
        &profiles,
        &AcceptAllLinks,
        &ProgressBar::hidden(),
    )
    .await
    .unwrap();
    assert_eq!(roster, once);

    let leah = roster.get("lwasser").unwrap();
    assert!(leah.packages_eic.contains("sunpy"));
    assert!(leah.packages_reviewed.contains("sunpy"));
    assert!(leah.packages_editor.contains("pandera"));
    for label in ["eic", "reviewer", "peer-review", "web-contrib"] {
        assert!(leah.contributor_type.contains(label), "{}", label);
    }

    let nabil = roster.get("nabobalis").unwrap();
    assert!(nabil.packages_submitted.contains("sunpy"));
    assert!(nabil.contributor_type.contains("submitting-author"));
    assert_eq!(nabil.name.as_deref(), Some("GitHub nabobalis"));

    let record = &records[0];
    assert_eq!(record.submitting_author.as_ref().unwrap().name, "Nabil Freij");
    assert_eq!(record.all_current_maintainers[0].name, "GitHub nabobalis");
    assert_eq!(record.eic.single().unwrap().name, "Leah Wasser");
    assert_eq!(record.reviewers[0].name, "Leah Wasser");
    assert_eq!(record.editor, Team::from(ReviewUser::new("", "CMarmo")));
}

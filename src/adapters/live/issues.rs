//! Live adapter for the `IssueTracker` port using the GitHub REST API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::issues::{Issue, IssueState, IssueTracker, Label, TrackerFuture};
use crate::repo::RepoSlug;

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Issue tracker backed by a GitHub repository.
pub struct GitHubIssueTracker {
    client: Client,
    base_url: String,
    token: String,
    repo: RepoSlug,
}

impl GitHubIssueTracker {
    /// Creates a tracker for `repo` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: &str, repo: RepoSlug) -> Result<Self, reqwest::Error> {
        Self::with_base_url(token, repo, GITHUB_API_URL)
    }

    /// Creates a tracker talking to a GitHub-compatible API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(
        token: &str,
        repo: RepoSlug,
        base_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(GITHUB_API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static("todo-sync"));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            repo,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{path}", self.base_url, self.repo.owner, self.repo.name)
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<String, BoxError> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| -> BoxError { format!("GitHub request to {context} failed: {e}").into() })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| -> BoxError {
            format!("Failed to read GitHub response for {context}: {e}").into()
        })?;

        if !status.is_success() {
            let msg = serde_json::from_str::<GitHubError>(&text).map(|e| e.message).unwrap_or(text);
            return Err(format!("GitHub API error ({}) for {context}: {msg}", status.as_u16()).into());
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, BoxError> {
        let text = self.send(request, context).await?;
        serde_json::from_str(&text).map_err(|e| -> BoxError {
            format!("Failed to parse GitHub response for {context}: {e}").into()
        })
    }

    /// Fetches every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, BoxError> {
        let mut items = Vec::new();
        for page in 1.. {
            let separator = if path.contains('?') { '&' } else { '?' };
            let url = self.url(&format!("{path}{separator}per_page={PER_PAGE}&page={page}"));
            let batch: Vec<T> = self.send_json(self.client.get(&url), path).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }
}

/// Error body returned by the GitHub API.
#[derive(Deserialize)]
struct GitHubError {
    message: String,
}

#[derive(Deserialize)]
struct GitHubLabel {
    name: String,
}

#[derive(Deserialize)]
struct GitHubIssue {
    number: u64,
    title: String,
    state: IssueState,
    #[serde(default)]
    labels: Vec<GitHubLabel>,
    /// Present when the "issue" is really a pull request.
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct CreatedIssue {
    number: u64,
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
}

#[derive(Serialize)]
struct AddLabelsRequest<'a> {
    labels: &'a [String],
}

#[derive(Serialize)]
struct UpdateStateRequest {
    state: IssueState,
}

impl IssueTracker for GitHubIssueTracker {
    fn list_open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
        Box::pin(async move {
            let raw: Vec<GitHubIssue> = self.get_all("/issues?state=open").await?;
            let issues: Vec<Issue> = raw
                .into_iter()
                .filter(|i| i.pull_request.is_none())
                .map(|i| Issue {
                    number: i.number,
                    title: i.title,
                    labels: i.labels.into_iter().map(|l| l.name).collect(),
                    state: i.state,
                })
                .collect();
            debug!(repo = %self.repo, count = issues.len(), "listed open issues");
            Ok(issues)
        })
    }

    fn list_labels(&self) -> TrackerFuture<'_, Vec<String>> {
        Box::pin(async move {
            let labels: Vec<GitHubLabel> = self.get_all("/labels").await?;
            Ok(labels.into_iter().map(|l| l.name).collect())
        })
    }

    fn create_label<'a>(&'a self, label: &'a Label) -> TrackerFuture<'a, ()> {
        Box::pin(async move {
            let request = self.client.post(self.url("/labels")).json(label);
            self.send(request, "create label").await?;
            Ok(())
        })
    }

    fn create_issue<'a>(
        &'a self,
        title: &'a str,
        body: &'a str,
        labels: &'a [String],
    ) -> TrackerFuture<'a, u64> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.url("/issues"))
                .json(&CreateIssueRequest { title, body, labels });
            let created: CreatedIssue = self.send_json(request, "create issue").await?;
            Ok(created.number)
        })
    }

    fn add_labels<'a>(&'a self, number: u64, labels: &'a [String]) -> TrackerFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.url(&format!("/issues/{number}/labels")))
                .json(&AddLabelsRequest { labels });
            self.send(request, "add labels").await?;
            Ok(())
        })
    }

    fn close_issue(&self, number: u64) -> TrackerFuture<'_, ()> {
        Box::pin(async move {
            let request = self
                .client
                .patch(self.url(&format!("/issues/{number}")))
                .json(&UpdateStateRequest { state: IssueState::Closed });
            self.send(request, "close issue").await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn tracker(server: &MockServer) -> GitHubIssueTracker {
        GitHubIssueTracker::with_base_url("t0ken", RepoSlug::new("acme", "widgets"), &server.uri())
            .unwrap()
    }

    #[tokio::test]
    async fn lists_open_issues_without_pull_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/issues"))
            .and(query_param("state", "open"))
            .and(query_param("page", "1"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"number": 1, "title": "fix X", "state": "open", "labels": [{"name": "todo-md"}]},
                {"number": 2, "title": "a PR", "state": "open", "labels": [], "pull_request": {}}
            ])))
            .mount(&server)
            .await;

        let issues = tracker(&server).list_open_issues().await.unwrap();
        assert_eq!(
            issues,
            [Issue {
                number: 1,
                title: "fix X".into(),
                labels: vec!["todo-md".into()],
                state: IssueState::Open,
            }]
        );
    }

    #[tokio::test]
    async fn follows_pagination_for_labels() {
        let server = MockServer::start().await;
        let full_page: Vec<_> = (0..PER_PAGE).map(|i| json!({"name": format!("l{i}")})).collect();
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/labels"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/labels"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "last"}])))
            .mount(&server)
            .await;

        let labels = tracker(&server).list_labels().await.unwrap();
        assert_eq!(labels.len(), PER_PAGE + 1);
        assert_eq!(labels.last().map(String::as_str), Some("last"));
    }

    #[tokio::test]
    async fn creates_issue_with_labels_in_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/issues"))
            .and(body_json(json!({
                "title": "fix X",
                "body": "from a.rs",
                "labels": ["todo-md", "bug"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let labels = vec!["todo-md".to_string(), "bug".to_string()];
        let number = tracker(&server).create_issue("fix X", "from a.rs", &labels).await.unwrap();
        assert_eq!(number, 42);
    }

    #[tokio::test]
    async fn adds_labels_to_existing_issue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/issues/3/labels"))
            .and(body_json(json!({"labels": ["perf"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "perf"}])))
            .expect(1)
            .mount(&server)
            .await;

        tracker(&server).add_labels(3, &["perf".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn closes_issue_with_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/acme/widgets/issues/7"))
            .and(body_json(json!({"state": "closed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"number": 7})))
            .expect(1)
            .mount(&server)
            .await;

        tracker(&server).close_issue(7).await.unwrap();
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/labels"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "Validation Failed"})),
            )
            .mount(&server)
            .await;

        let label = Label { name: "bug".into(), color: "ff0000".into(), description: String::new() };
        let err = tracker(&server).create_label(&label).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("422"), "{text}");
        assert!(text.contains("Validation Failed"), "{text}");
    }
}

//! Shared fixtures for integration tests: a mock gallery site and config files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use grab_core::config::{self as grab_config, Config};
use grab_core::engine::{self, DownloadSummary, EngineError, ExtractionSummary, Flags, RunContext};
use grab_core::{HttpClient, urls_from_args};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[path = "../../src/test_support/socket_guard.rs"]
pub mod socket_guard;

/// Gallery page served at `/gallery/123/test`; `{{BASE}}` becomes the server URI.
const GALLERY_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Grab Test Server</title>
</head>
<body>
  <h1>Grab Test Server</h1>
  <p>Author: @everdrone</p>
  <div>
    <img src="{{BASE}}/img/a.jpg" />
    <img src="{{BASE}}/img/b.jpg" />
    <img src="{{BASE}}/img/c.jpg" />
  </div>
  <div>
    <img src="/img/a.jpg" />
    <img src="/img/b.jpg" />
    <img src="/img/c.jpg" />
  </div>
  <div>
    <video src="{{BASE}}/video/a/small.mp4" ></video>
    <video src="{{BASE}}/video/b/small.mp4" ></video>
    <video src="{{BASE}}/video/c/small.mp4" ></video>
  </div>
  <div>
    <img src="{{BASE}}/not-found/a.jpg" />
  </div>
</body>
</html>"#;

/// Mounts the gallery page and its assets. Unknown paths answer 404.
pub async fn mount_gallery(server: &MockServer) {
    let page = GALLERY_PAGE.replace("{{BASE}}", &server.uri());
    Mock::given(method("GET"))
        .and(path("/gallery/123/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(server)
        .await;

    for id in ["a", "b", "c"] {
        Mock::given(method("GET"))
            .and(path(format!("/img/{id}.jpg")))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("image{id}")))
            .mount(server)
            .await;
        for size in ["small", "large"] {
            Mock::given(method("GET"))
                .and(path(format!("/video/{id}/{size}.mp4")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(format!("video{id}{size}")),
                )
                .mount(server)
                .await;
        }
    }
}

/// Writes `grab.hcl` into `dir`, replacing `LOCATION` with `location`.
pub fn write_config(dir: &Path, text: &str, location: &Path) -> PathBuf {
    let path = dir.join("grab.hcl");
    let text = text.replace("LOCATION", &location.display().to_string());
    std::fs::write(&path, text).unwrap();
    path
}

/// What [`run_pipeline`] produced, with the config as left by extraction.
pub struct Run {
    pub config: Config,
    pub extraction: ExtractionSummary,
    pub downloads: DownloadSummary,
}

/// Loads the config and runs route, extract and execute the way `grab get` does.
pub async fn run_pipeline(
    config_path: &Path,
    args: &[String],
    working_dir: &Path,
    flags: Flags,
) -> Result<Run, EngineError> {
    let (mut config, cache) = grab_config::load(config_path).unwrap();
    let urls = urls_from_args(args, working_dir).unwrap();
    engine::route(&urls, &mut config.sites, &cache);

    let ctx = RunContext::new(&config, working_dir.to_path_buf()).unwrap();
    let client = HttpClient::new().unwrap();
    let extraction = engine::extract_all(&mut config, &cache, &ctx, &flags, &client).await?;
    let downloads = engine::execute(&config, &ctx, &flags, &client).await?;
    Ok(Run {
        config,
        extraction,
        downloads,
    })
}

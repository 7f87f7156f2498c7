//! End-to-end runs of the agent against a mock API

mod common;

use restpilot::testing::{fixtures, ScriptedModel};
use restpilot::RunStatus;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_kurosawa_filmography() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/person/5026/movie_credits"))
        .and(header("authorization", "Bearer tmdb-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::kurosawa_movie_credits()))
        .expect(1)
        .mount(&server)
        .await;

    let model = Arc::new(ScriptedModel::new([
        "Plan step 1: Get the movies directed by Akira Kurosawa (id 5026)",
        "API calling 1: GET /person/5026/movie_credits to get the movies directed by Akira Kurosawa (id 5026)",
        common::KUROSAWA_CALL,
        "Seven Samurai (346), Rashomon (548), Ran (11645)",
        "Final Answer: Akira Kurosawa directed Seven Samurai, Rashomon and Ran.",
    ]));
    let mut config = common::test_config();
    config.api.access_token = Some("tmdb-token".to_string());
    let agent = common::setup_agent(&config, &server, model.clone());

    let outcome = agent.run("What movies did Akira Kurosawa direct?").await.unwrap();

    assert_eq!(outcome.status, RunStatus::Finished);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(
        outcome.final_answer(),
        "Akira Kurosawa directed Seven Samurai, Rashomon and Ran."
    );
    assert_eq!(outcome.history.len(), 1);
    assert_eq!(
        outcome.history[0].plan,
        "Get the movies directed by Akira Kurosawa (id 5026)"
    );
    assert!(outcome.history[0]
        .result
        .ends_with("Observation: Seven Samurai (346), Rashomon (548), Ran (11645)"));

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 5);
    // Caller sees the docs of the matched template.
    assert!(prompts[2].contains("== Docs for GET /person/{person_id}/movie_credits =="));
    // Parser sees the raw body and the output instruction.
    assert!(prompts[3].contains("Rashomon"));
    assert!(prompts[3].contains("What are the names and ids of the movies directed by this person?"));
    // The second planning call is conditioned on the first step.
    assert!(prompts[4].contains("Plan step 1: Get the movies directed by Akira Kurosawa (id 5026)"));
    assert!(prompts[4].contains("Seven Samurai (346)"));
}

#[tokio::test]
async fn test_zero_iterations_returns_first_plan() {
    let server = MockServer::start().await;
    let model = Arc::new(ScriptedModel::new(["Plan step 1: Search for the person Akira Kurosawa"]));
    let mut config = common::test_config();
    config.agent.max_iterations = Some(0);
    let agent = common::setup_agent(&config, &server, model.clone());

    let outcome = agent.run("What movies did Akira Kurosawa direct?").await.unwrap();

    assert_eq!(outcome.status, RunStatus::BudgetExceeded);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.answer, "Search for the person Akira Kurosawa");
    assert!(outcome.history.is_empty());
    assert_eq!(model.call_count(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_step_error_becomes_observation() {
    let server = MockServer::start().await;
    let model = Arc::new(ScriptedModel::new([
        "Get the details of the movie with id 346",
        "GET /movie/346 to get the details of the movie",
        "Operation: FETCH\nInput: {\"url\": \"/movie/346\"}",
        "Final Answer: I could not get the movie details.",
    ]));
    let agent = common::setup_agent(&common::test_config(), &server, model.clone());

    let outcome = agent.run("Tell me about Seven Samurai").await.unwrap();

    assert_eq!(outcome.status, RunStatus::Finished);
    assert_eq!(outcome.history.len(), 1);
    assert_eq!(outcome.history[0].result, "Error: Unsupported operation: FETCH");
    assert!(model.prompts()[3].contains("API response: Error: Unsupported operation: FETCH"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_interpreted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = Arc::new(ScriptedModel::new([
        "Get the details of the movie with id 999999",
        "GET /movie/999999 to get the details of the movie",
        "Operation: GET\nInput: {\"url\": \"/movie/999999\", \"description\": \"Details of the movie.\", \"output_instructions\": \"What is the title of the movie?\"}",
        "The movie could not be found.",
        "Final Answer: There is no movie with id 999999.",
    ]));
    let agent = common::setup_agent(&common::test_config(), &server, model.clone());

    let outcome = agent.run("What is movie 999999?").await.unwrap();

    assert_eq!(outcome.status, RunStatus::Finished);
    assert!(outcome.history[0]
        .result
        .ends_with("Observation: The movie could not be found."));
    assert!(model.prompts()[3].contains("could not be found"));
}

#[tokio::test]
async fn test_no_api_call_needed() {
    let server = MockServer::start().await;
    let model = Arc::new(ScriptedModel::new([
        "Answer from the previous result",
        "No API call needed. The id of Akira Kurosawa is 5026.\nextra text",
        "Final Answer: 5026",
    ]));
    let agent = common::setup_agent(&common::test_config(), &server, model.clone());

    let outcome = agent.run("What is the id of Akira Kurosawa?").await.unwrap();

    assert_eq!(outcome.history[0].result, "The id of Akira Kurosawa is 5026.");
    assert_eq!(outcome.final_answer(), "5026");
    assert_eq!(model.call_count(), 3);
}

#[tokio::test]
async fn test_completion_failure_ends_run() {
    let server = MockServer::start().await;
    let model = Arc::new(ScriptedModel::new(["Get the popular movies", "GET /movie/popular"]));
    let agent = common::setup_agent(&common::test_config(), &server, model);

    // Script runs dry at the caller: completion errors are not step-local.
    let result = agent.run("What is popular right now?").await;
    assert!(matches!(result, Err(restpilot::AgentError::Llm(_))));
}

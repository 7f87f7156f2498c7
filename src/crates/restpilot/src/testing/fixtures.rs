//! Sample API descriptions shared by unit and integration tests.

use crate::error::Result;
use crate::spec::{reduce_openapi_spec, ReduceOptions, ReducedSpec, SpecIndex};
use serde_json::{json, Value};

/// Trimmed TMDB OpenAPI document.
pub fn tmdb_openapi() -> Value {
    let path_param = |name: &str| {
        json!({"name": name, "in": "path", "required": true, "schema": {"type": "integer"}})
    };
    let json_body = |schema: Value| json!({"description": "OK", "content": {"application/json": {"schema": schema}}});

    json!({
        "openapi": "3.0.0",
        "info": {"title": "TMDB", "description": "The Movie Database API", "version": "3"},
        "servers": [{"url": "https://api.themoviedb.org/3"}],
        "paths": {
            "/search/person": {"get": {
                "description": "Search for people by name.",
                "parameters": [
                    {"name": "query", "in": "query", "required": true, "schema": {"type": "string"}},
                    {"name": "page", "in": "query", "required": false, "schema": {"type": "integer"}}
                ],
                "responses": {"200": json_body(json!({"$ref": "#/components/schemas/PersonSearch"}))}
            }},
            "/person/{person_id}": {"get": {
                "description": "Get the primary person details by id.",
                "parameters": [path_param("person_id")],
                "responses": {"200": json_body(json!({
                    "type": "object",
                    "properties": {"id": {"type": "integer"}, "name": {"type": "string"}, "birthday": {"type": "string"}}
                }))}
            }},
            "/person/{person_id}/movie_credits": {"get": {
                "description": "Get the movie credits for a person.",
                "parameters": [path_param("person_id")],
                "responses": {"200": json_body(json!({"$ref": "#/components/schemas/MovieCredits"}))}
            }},
            "/movie/{movie_id}": {"get": {
                "description": "Get the primary information about a movie.",
                "parameters": [path_param("movie_id")],
                "responses": {"200": json_body(json!({
                    "type": "object",
                    "properties": {"id": {"type": "integer"}, "title": {"type": "string"}, "release_date": {"type": "string"}}
                }))}
            }},
            "/movie/{movie_id}/credits": {"get": {
                "description": "Get the cast and crew for a movie.",
                "parameters": [path_param("movie_id")],
                "responses": {"200": json_body(json!({"$ref": "#/components/schemas/MovieCredits"}))}
            }},
            "/movie/latest": {"get": {
                "description": "Get the most newly created movie.",
                "responses": {"200": json_body(json!({"type": "object", "properties": {"id": {"type": "integer"}}}))}
            }},
            "/movie/popular": {"get": {
                "description": "Get a list of the current popular movies on TMDB.",
                "responses": {"200": json_body(json!({"type": "object", "properties": {"results": {"type": "array"}}}))}
            }},
            "/tv/{tv_id}/season/{season_number}": {"get": {
                "description": "Get the TV season details by id.",
                "parameters": [path_param("tv_id"), path_param("season_number")],
                "responses": {"200": json_body(json!({"type": "object", "properties": {"episodes": {"type": "array"}}}))}
            }}
        },
        "components": {"schemas": {
            "PersonSearch": {
                "type": "object",
                "properties": {
                    "page": {"type": "integer"},
                    "results": {"type": "array", "items": {
                        "type": "object",
                        "properties": {"id": {"type": "integer"}, "name": {"type": "string"}, "known_for_department": {"type": "string"}}
                    }}
                }
            },
            "MovieCredits": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "cast": {"type": "array", "items": {"type": "object", "properties": {
                        "id": {"type": "integer"}, "title": {"type": "string"}, "character": {"type": "string"}
                    }}},
                    "crew": {"type": "array", "items": {"type": "object", "properties": {
                        "id": {"type": "integer"}, "title": {"type": "string"}, "job": {"type": "string"}, "department": {"type": "string"}
                    }}}
                }
            }
        }}
    })
}

/// Trimmed Spotify OpenAPI document with a polymorphic `/search`.
pub fn spotify_openapi() -> Value {
    let paged = |item: &str| {
        json!({"type": "object", "properties": {
            "href": {"type": "string"},
            "items": {"type": "array", "items": {"type": "object", "description": item}},
            "total": {"type": "integer"}
        }})
    };
    let json_body = |schema: Value| json!({"description": "OK", "content": {"application/json": {"schema": schema}}});

    json!({
        "openapi": "3.0.3",
        "info": {"title": "Spotify Web API", "version": "1"},
        "servers": [{"url": "https://api.spotify.com/v1"}],
        "paths": {
            "/search": {"get": {
                "description": "Get Spotify catalog information that matches a keyword string.",
                "parameters": [
                    {"name": "q", "in": "query", "required": true, "schema": {"type": "string"}},
                    {"name": "type", "in": "query", "required": true, "schema": {"type": "array"}},
                    {"name": "limit", "in": "query", "required": false, "schema": {"type": "integer"}}
                ],
                "responses": {"200": json_body(json!({"type": "object", "properties": {
                    "tracks": paged("track"),
                    "artists": paged("artist"),
                    "albums": paged("album"),
                    "playlists": paged("playlist")
                }}))}
            }},
            "/me": {"get": {
                "description": "Get detailed profile information about the current user.",
                "responses": {"200": json_body(json!({"type": "object", "properties": {"id": {"type": "string"}, "display_name": {"type": "string"}}}))}
            }},
            "/me/playlists": {"get": {
                "description": "Get a list of the playlists owned or followed by the current user.",
                "responses": {"200": json_body(paged("playlist"))}
            }},
            "/playlists/{playlist_id}/tracks": {"post": {
                "description": "Add one or more items to a user's playlist.",
                "parameters": [{"name": "playlist_id", "in": "path", "required": true, "schema": {"type": "string"}}],
                "requestBody": {"content": {"application/json": {"schema": {"type": "object", "properties": {"uris": {"type": "array"}}}}}},
                "responses": {"201": json_body(json!({"type": "object", "properties": {"snapshot_id": {"type": "string"}}}))}
            }},
            "/me/player/volume": {"put": {
                "description": "Set the volume for the user's current playback device.",
                "parameters": [{"name": "volume_percent", "in": "query", "required": true, "schema": {"type": "integer"}}],
                "responses": {"204": {"description": "Playback volume set"}}
            }},
            "/artists/{id}/albums": {"get": {
                "description": "Get Spotify catalog information about an artist's albums.",
                "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
                "responses": {"200": json_body(paged("album"))}
            }}
        }
    })
}

pub fn tmdb_reduced_spec() -> Result<ReducedSpec> {
    reduce_openapi_spec(
        &tmdb_openapi(),
        &ReduceOptions {
            only_required: false,
            ..ReduceOptions::default()
        },
    )
}

pub fn spotify_reduced_spec() -> Result<ReducedSpec> {
    reduce_openapi_spec(
        &spotify_openapi(),
        &ReduceOptions {
            only_required: false,
            merge_allof: true,
            ..ReduceOptions::default()
        },
    )
}

pub fn tmdb_index() -> Result<SpecIndex> {
    SpecIndex::new(tmdb_reduced_spec()?)
}

pub fn spotify_index() -> Result<SpecIndex> {
    SpecIndex::new(spotify_reduced_spec()?)
}

/// TMDB index whose base URL points at a local mock server.
pub fn tmdb_index_at(base_url: &str) -> Result<SpecIndex> {
    let mut spec = tmdb_reduced_spec()?;
    if let Some(server) = spec.servers.first_mut() {
        server.url = base_url.to_string();
    }
    SpecIndex::new(spec)
}

/// A `movie_credits` response body for Akira Kurosawa (id 5026).
pub fn kurosawa_movie_credits() -> Value {
    json!({
        "id": 5026,
        "cast": [],
        "crew": [
            {"id": 346, "title": "Seven Samurai", "job": "Director", "department": "Directing"},
            {"id": 548, "title": "Rashomon", "job": "Director", "department": "Directing"},
            {"id": 11645, "title": "Ran", "job": "Director", "department": "Directing"},
            {"id": 3782, "title": "Ikiru", "job": "Screenplay", "department": "Writing"}
        ]
    })
}

//! Prompt templates and few-shot examples
//!
//! Templates use `{name}` slots filled by [`render`]. Braces that are not a
//! known slot (such as `{user_id}` in the guidance text) are left alone.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static SLOT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Fill `{key}` slots of `template` in a single pass.
///
/// Substituted values are never scanned again, so documentation containing
/// `{param}` placeholders is inserted verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    SLOT_REGEX
        .replace_all(template, |caps: &Captures| {
            vars.iter()
                .find(|(key, _)| *key == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub const PLANNER_PROMPT: &str = r#"You are an agent that plans solution to user queries.
You should always give your plan in natural language.
Another model will receive your plan and find the right API calls and give you the result in natural language.
If you assess that the current plan has not been fulfilled, you can output "Continue" to let the API selector select another API to fulfill the plan.
If you think you have got the final answer or the user query has been fulfilled, just output the answer immediately. If the query has not been fulfilled, you should continue to output your plan.
In most case, search, filter, and sort should be completed in a single step.
The plan should be as specific as possible. It is better not to use pronouns in plan, but to use the corresponding results obtained previously. For example, instead of "Get the most popular movie directed by this person", you should output "Get the most popular movie directed by Martin Scorsese (1032)". If you want to iteratively query something about items in a list, then the list and the elements in the list should also appear in your plan.
The plan should be straightforward. If you want to search, sort or filter, you can put the condition in your plan. For example, if the query is "Who is the lead actor of In the Mood for Love (id 843)", instead of "get the list of actors of In the Mood for Love", you should output "get the lead actor of In the Mood for Love (843)".

Starting below, you should follow this format:

User query: the query a User wants help with related to the API.
Plan step 1: the first step of your plan for how to solve the query
API response: the result of executing the first step of your plan, including the specific API call made.
Plan step 2: based on the API response, the second step of your plan for how to solve the query. If the last step result is not what you want, you can output "Continue" to let the API selector select another API to fulfill the plan. Pay attention to the specific API called in the last step API response. If an improper API is called, then the response may be wrong and you should give a new plan.
API response: the result of executing the second step of your plan
... (this Plan step n and API response can repeat N times)
Thought: I am finished executing a plan and have the information the user asked for or the data the user asked to create
Final Answer: the final output from executing the plan


{icl_examples}

Begin!

User query: {input}
{agent_scratchpad}Plan step {step}:"#;

pub const SELECTOR_PROMPT: &str = r#"You are a planner that plans a sequence of RESTful API calls to assist with user queries against an API.
Another API caller will receive your plan call the corresponding APIs and finally give you the result in natural language.
The API caller also has filtering, sorting functions to post-process the response of APIs. Therefore, if you think the API response should be post-processed, just tell the API caller to do so.
If you think you have got the final answer, do not make other API calls and just output the answer immediately. For example, the query is search for a person, you should just return the id and name of the person.

----

Here are name and description of available APIs.
Do not use APIs that are not listed here.

{endpoints}

----

Starting below, you should follow this format:

Background: background information which you can use to execute the plan, e.g., the id of a person, the id of tracks by Faye Wong. In most cases, you must use the background information instead of requesting these information again.
User query: the query a User wants help with related to the API
API calling 1: the first api call you want to make. Note the API calling can contain conditions such as filtering, sorting, etc. For example, "GET /movie/18820/credits to get the director of the movie Happy Together", "GET /movie/popular to get the top-1 most popular movie". If user query contains some filter condition, such as the latest, the most popular, the highest rated, then the API calling plan should also contain the filter condition. If you think there is no need to call an API, output "No API call needed." and then output the final answer according to the user query and background information.
API response: the response of API calling 1
... (this API calling n and API response can repeat N times, but most queries can be solved in 1-2 step)

{icl_examples}

Note, if the API path contains "{}", it means that it is a variable and you should replace it with the appropriate value. For example, if the path is "/users/{user_id}/tweets", you should replace "{user_id}" with the user id. "{" and "}" cannot appear in the url. In most cases, the id value is in the background or the API response. Just copy the id faithfully. If the id is not in the background, instead of creating one, call other APIs to query the id.

Begin!

Background: {background}
User query: {plan}
{agent_scratchpad}API calling {step}:"#;

pub const CALLER_PROMPT: &str = r#"You are an agent that gets an API calls and given their documentation, should execute them and return the final response.
If you cannot complete them and run into issues, you should explain the issue. When interacting with API objects, you should extract ids for inputs to other API calls but ids and names for outputs returned to the User.
Your task is to complete the corresponding api calls according to the plan.


Here is documentation on the API:
Base url: {api_url}
Endpoints: {api_docs}

If the API path contains "{}", it means that it is a variable and you should replace it with the appropriate value. For example, if the path is "/users/{user_id}/tweets", you should replace "{user_id}" with the user id. "{" and "}" cannot appear in the url.

You can use http request method, i.e., GET, POST, DELETE, PATCH, PUT, and generate the corresponding parameters according to the API documentation and the plan.
The input should be a JSON string which has 3 base keys: url, description, output_instructions
The value of "url" should be a string.
The value of "description" should describe what the API response is about. The description should be specific.
The value of "output_instructions" should be instructions on what information to extract from the response, for example the id(s) for a resource(s) that the POST request creates. Note "output_instructions" MUST be natural language and as verbose as possible! It cannot be "return the full response". Output instructions should faithfully contain the contents of the api calling plan and be as specific as possible. The output instructions can also contain conditions such as filtering, sorting, etc.
If you are using GET method, add "params" key, and the value of "params" should be a dict of key-value pairs.
If you are using POST, PATCH or PUT methods, add "data" key, and the value of "data" should be a dict of key-value pairs.
Remember to add a comma after every value except the last one, ensuring that the overall structure of the JSON remains valid.

{icl_examples}

I will give you the background information and the plan you should execute.
Background: background information which you can use to execute the plan, e.g., the id of a person.
Plan: the plan of API calls to execute

If you have completed all steps in the plan and have nothing else to do, produce:
Execution Result: <final summary of the entire plan's execution>

Follow this format strictly and do not add any additional information.

Plan: {api_plan}
Background: {background}
Thought: you should always think about what to do
Operation: the request method to take, should be one of the following: GET, POST, DELETE, PATCH, PUT
Input: the input to the operation in json format

Begin!
"#;

pub const CALLER_EXAMPLES: [&str; 3] = [
    r#"Operation: POST
Input: {
    "url": "https://api.twitter.com/2/tweets",
    "params": {
        "tweet.fields": "created_at"
    },
    "data": {
        "text": "Hello world!"
    },
    "description": "The API response is a twitter object.",
    "output_instructions": "What is the id of the new twitter?"
}"#,
    r#"Operation: GET
Input: {
    "url": "https://api.themoviedb.org/3/person/5026/movie_credits",
    "description": "The API response is the movie credit list of Akira Kurosawa (id 5026)",
    "output_instructions": "What are the names and ids of the movies directed by this person?"
}"#,
    r#"Operation: PUT
Input: {
    "url": "https://api.spotify.com/v1/me/player/volume",
    "params": {
        "volume_percent": "20"
    },
    "description": "Set the volume for the current playback device."
}"#,
];

pub const PARSER_PROMPT: &str = r#"Here is an API response in JSON format, returned by calling {api_path}.
API description: {api_description}
Response schema:
{response_schema}

The request was made with: {api_param}

API response: {json}

The response is about: {response_description}

====
Your task is to extract some information according to these instructions: {query}
When working with API objects, you should usually use ids over names. Do not return any ids or names that are not in the response.
If the response indicates an error, you should instead output a summary of the error.

Output:"#;

pub const TMDB_PLANNER_EXAMPLES: &str = r#"Example 1:
User query: give me some movies performed by Tony Leung.
Plan step 1: search person with name "Tony Leung"
API response: Tony Leung's person_id is 1337
Plan step 2: collect the list of movies performed by Tony Leung whose person_id is 1337
API response: Shang-Chi and the Legend of the Ten Rings, In the Mood for Love, Hero
Thought: I am finished executing a plan and have the information the user asked for or the data the user asked to create
Final Answer: Tony Leung has performed in Shang-Chi and the Legend of the Ten Rings, In the Mood for Love, Hero

Example 2:
User query: Who wrote the screenplay for the most famous movie directed by Martin Scorsese?
Plan step 1: search for the most popular movie directed by Martin Scorsese
API response: Successfully called GET /search/person to search for the director "Martin Scorsese". The id of Martin Scorsese is 1032
Plan step 2: Continue. search for the most popular movie directed by Martin Scorsese (1032)
API response: Successfully called GET /person/{person_id}/movie_credits to get the most popular movie directed by Martin Scorsese. The most popular movie directed by Martin Scorsese is Shutter Island (11324)
Plan step 3: search for the screenwriter of Shutter Island
API response: The screenwriter of Shutter Island is Laeta Kalogridis (20294)
Thought: I am finished executing a plan and have the information the user asked for or the data the user asked to create
Final Answer: Laeta Kalogridis wrote the screenplay for the most famous movie directed by Martin Scorsese."#;

pub const SPOTIFY_PLANNER_EXAMPLES: &str = r#"Example 1:
User query: set the volume to 20 and skip to the next track.
Plan step 1: set the volume to 20
API response: Successfully set the volume to 20.
Plan step 2: skip to the next track
API response: Successfully skipped to the next track.
Thought: I am finished executing a plan and completed the user's instructions
Final Answer: I have set the volume to 20 and skipped to the next track.

Example 2:
User query: Make a new playlist called "Love Coldplay" containing the most popular songs by Coldplay
Plan step 1: search for the most popular songs by Coldplay
API response: Successfully called GET /search to search for the artist Coldplay. The id of Coldplay is 4gzpq5DPGxSnKTe4SA8HAU
Plan step 2: Continue. search for the most popular songs by Coldplay (4gzpq5DPGxSnKTe4SA8HAU)
API response: Successfully called GET /artists/4gzpq5DPGxSnKTe4SA8HAU/top-tracks to get the most popular songs by Coldplay. The most popular songs by Coldplay are Yellow (3AJwUDP919kvQ9QcozQPxg), Viva La Vida (1mea3bSkSGXuIRvnydlB5b).
Plan step 3: make a playlist called "Love Coldplay"
API response: Successfully called POST /users/{user_id}/playlists to make a playlist called "Love Coldplay". The playlist id is 7LjHVU3t3fcxj5aiPFEW4T.
Plan step 4: Add the most popular songs by Coldplay, Yellow (3AJwUDP919kvQ9QcozQPxg), Viva La Vida (1mea3bSkSGXuIRvnydlB5b), to playlist "Love Coldplay" (7LjHVU3t3fcxj5aiPFEW4T)
API response: Successfully called POST /playlists/7LjHVU3t3fcxj5aiPFEW4T/tracks to add Yellow, Viva La Vida in playlist "Love Coldplay".
Thought: I am finished executing a plan and have the data the user asked to create
Final Answer: I have made a new playlist called "Love Coldplay" containing Yellow and Viva La Vida by Coldplay."#;

pub const TMDB_SELECTOR_EXAMPLES: &str = r#"Example 1:
Background: The id of Wong Kar-Wai is 12453
User query: give me the latest movie directed by Wong Kar-Wai.
API calling 1: GET /person/12453/movie_credits to get the latest movie directed by Wong Kar-Wai (id 12453)
API response: The latest movie directed by Wong Kar-Wai is The Grandmaster (id 44865), ...

Example 2:
Background: No background
User query: search for movies produced by DreamWorks Animation
API calling 1: GET /search/company to get the id of DreamWorks Animation
API response: DreamWorks Animation's company_id is 521
Instruction: Continue. Search for the movies produced by DreamWorks Animation
API calling 2: GET /discover/movie to get the movies produced by DreamWorks Animation
API response: Flushed Away, The Croods, Madagascar, ...

Example 3:
Background: The id of the movie Happy Together is 18329
User query: search for the director of Happy Together
API calling 1: GET /movie/18329/credits to get the director for the movie Happy Together
API response: The director of Happy Together is Wong Kar-Wai (12453)

Example 4:
Background: No background
User query: search for the most popular movie
API calling 1: GET /movie/popular to get the most popular movie
API response: The most popular movie is Avatar: The Way of Water (76600)"#;

pub const SPOTIFY_SELECTOR_EXAMPLES: &str = r#"Example 1:
Background: No background
User query: what is the id of album Kind of Blue.
API calling 1: GET /search to search for the album "Kind of Blue"
API response: Kind of Blue's album_id is 1weenld61qoidwYuZ1GESA

Example 2:
Background: No background
User query: get my followed artists
API calling 1: GET /me/following to get the artists followed by me
API response: The artists followed by me are Taylor Swift (06HL4z0CvFAxyc27GXpf02), ...

Example 3:
Background: No background
User query: get the id of my playlist "Chill"
API calling 1: GET /me/playlists to get the playlists of the current user
API response: The id of the playlist "Chill" is 37i9dQZF1DX4WYpdgoIcn6

Example 4:
Background: The id of the current user is 31tgs2q6bqo3h5iopqimqchn5mvm
User query: add the track Yellow (3AJwUDP919kvQ9QcozQPxg) to my playlist "Chill" (37i9dQZF1DX4WYpdgoIcn6)
API calling 1: POST /playlists/37i9dQZF1DX4WYpdgoIcn6/tracks to add Yellow (3AJwUDP919kvQ9QcozQPxg) to the playlist "Chill"
API response: Successfully added Yellow to the playlist "Chill"."#;

pub mod ai {
    pub mod ai_request;
    pub mod ai_route;
}

pub mod liveness_route;

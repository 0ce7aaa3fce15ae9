// handlers/mod.rs - two handler tiers
//
// Public (no auth) → Protected (JWT auth plus per-route entitlement)
pub mod protected; // /api/{entity}[/:id]
pub mod public; // / and /health
pub mod response;

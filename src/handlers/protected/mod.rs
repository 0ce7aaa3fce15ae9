// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/{entity}
// Middleware: JWT validation, then an entitlement check inside each handler
pub mod entity;

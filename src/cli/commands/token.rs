use anyhow::Context;
use clap::Args;
use std::collections::BTreeMap;

use crate::auth::{generate_jwt, parse_grant, Claims};
use crate::config::config;
use crate::types::Entitlement;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Token subject")]
    pub subject: String,

    #[arg(
        long = "grant",
        required = true,
        value_parser = parse_grant,
        help = "Entity:Entitlement,... (repeatable; use * for every entity)"
    )]
    pub grants: Vec<(String, Vec<Entitlement>)>,

    #[arg(long, help = "Lifetime in hours (defaults to the configured expiry)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs) -> anyhow::Result<()> {
    let config = config();

    let mut entitlements: BTreeMap<String, Vec<Entitlement>> = BTreeMap::new();
    for (entity, granted) in args.grants {
        let list = entitlements.entry(entity).or_default();
        for entitlement in granted {
            if !list.contains(&entitlement) {
                list.push(entitlement);
            }
        }
    }

    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let claims = Claims::new(args.subject, entitlements, hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret).context("failed to mint token")?;

    println!("{}", token);
    Ok(())
}

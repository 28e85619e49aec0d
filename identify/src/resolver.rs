//! Identity resolution: from an assertion to the one identity it denotes.

use tracing::debug;
use trackid_assertion::{Assertion, AssertionComponent, ComponentKind, Conjunction};
use trackid_directory::{DirectoryError, IdentityDirectory};
use trackid_types::{Identity, UserId, Username};

use crate::error::ResolveError;

/// The identity an assertion resolved to, and the alternative that matched.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub identity: Identity,
    pub matched: Conjunction,
}

/// Resolve `assertion` against `directory`.
///
/// Alternatives are tried left to right; the first whose terms all resolve wins.
/// Terms of one alternative that resolve to different users are an
/// [`ResolveError::AssertionMismatch`]: the run stops there rather than trying
/// the next alternative. `me` is used only to skip reloading the caller's own
/// identity; rejecting self-identification is the caller's job.
pub async fn resolve(
    directory: &dyn IdentityDirectory,
    assertion: &Assertion,
    me: Option<&Identity>,
) -> Result<Resolution, ResolveError> {
    if let Some(unknown) = assertion
        .components()
        .find(|c| c.kind() == ComponentKind::Unknown)
    {
        return Err(ResolveError::UnknownService {
            service: unknown.service.clone(),
        });
    }

    for conjunction in &assertion.any_of {
        let Some(uid) = resolve_conjunction(directory, conjunction).await? else {
            continue;
        };
        debug!(%uid, matched = %conjunction.render(), "assertion resolved");
        let identity = match me {
            Some(me) if me.id == uid => me.clone(),
            _ => directory.load_identity(&uid).await?,
        };
        return Ok(Resolution {
            identity,
            matched: conjunction.clone(),
        });
    }

    Err(ResolveError::NotFound {
        assertion: assertion.render(),
    })
}

/// The single user every term of `conjunction` denotes, or `None` if some term
/// denotes nobody.
async fn resolve_conjunction(
    directory: &dyn IdentityDirectory,
    conjunction: &Conjunction,
) -> Result<Option<UserId>, ResolveError> {
    let mut resolved: Option<(UserId, &AssertionComponent)> = None;
    for term in &conjunction.terms {
        let Some(uid) = resolve_term(directory, term).await? else {
            debug!(term = %term, "term denotes nobody");
            return Ok(None);
        };
        if let Some((expected, first)) = &resolved {
            if *expected != uid {
                debug!(first = %first, term = %term, "terms denote different users");
                return Err(ResolveError::AssertionMismatch {
                    term: term.to_string(),
                    expected: expected.clone(),
                    found: uid,
                });
            }
        } else {
            resolved = Some((uid, term));
        }
    }
    Ok(resolved.map(|(uid, _)| uid))
}

async fn resolve_term(
    directory: &dyn IdentityDirectory,
    term: &AssertionComponent,
) -> Result<Option<UserId>, ResolveError> {
    match term.kind() {
        ComponentKind::Keybase => match Username::parse(&term.value) {
            Ok(name) => Ok(directory.lookup_username(&name).await?),
            Err(_) => Ok(None),
        },
        ComponentKind::Uid => {
            let Ok(uid) = UserId::parse(&term.value) else {
                return Ok(None);
            };
            match directory.load_identity(&uid).await {
                Ok(_) => Ok(Some(uid)),
                Err(DirectoryError::NotFound(_)) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
        ComponentKind::Proof(_) => match term.proof_key() {
            Some(key) => Ok(directory.lookup_proof(&key).await?),
            None => Ok(None),
        },
        ComponentKind::Unknown => Err(ResolveError::UnknownService {
            service: term.service.clone(),
        }),
    }
}

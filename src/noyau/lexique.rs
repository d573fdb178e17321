// src/noyau/lexique.rs
//
// Analyse lexicale
// ----------------
// Balayage unique de gauche à droite ; priorité à chaque position :
//   irrationnel long `<...>` -> paramètre `?` -> fonction (plus long nom suivi
//   d’une parenthèse) -> littéral numérique -> parenthèse -> séparateur ->
//   irrationnel natif -> opérateur / irrationnel court.
//
// Passes (chacune reconstruit le flux et ses plages) :
//   - contrôle + unification des parenthèses ( < [ < {
//   - multiplication élidée (`2x`, `3(1+1)`, `x y`)
//   - fractionnement des littéraux (décimaux, %, fractions mixtes)

use std::cmp::Reverse;

use log::trace;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::config::Tables;
use super::erreurs::{Erreur, FormeIrrationnel, GenreErreur, Plage, ProblemeParenthese};
use super::jetons::{
    caractere_reserve, format_jetons, FluxJetons, Jeton, Origine, TypeJeton, IRRATIONNELS_NATIFS,
    OPERATEURS,
};

/* ------------------------ Balayage ------------------------ */

fn chiffres_depuis(cs: &[char], mut j: usize) -> usize {
    while j < cs.len() && cs[j].is_ascii_digit() {
        j += 1;
    }
    j
}

/// Après un `%` : fin, opérateur binaire, fermeture, séparateur ou barre => pourcentage.
fn suivi_de_pourcentage(cs: &[char], k: usize) -> bool {
    k >= cs.len() || "+-*/^%|)]},;".contains(cs[k])
}

/// Littéral numérique commençant en `i` (un chiffre) : (type, fin exclusive).
fn nombre_a(cs: &[char], i: usize, barres_ouvertes: bool) -> (TypeJeton, usize) {
    let mut j = chiffres_depuis(cs, i);

    // fraction mixte `a_b/c` (b signé permis) ; `a|b/c` seulement hors d’une
    // valeur absolue ouverte
    if j < cs.len() && (cs[j] == '_' || (cs[j] == '|' && !barres_ouvertes)) {
        let signe = cs[j] == '_' && j + 1 < cs.len() && (cs[j + 1] == '+' || cs[j + 1] == '-');
        let debut_b = if signe { j + 2 } else { j + 1 };
        let b = chiffres_depuis(cs, debut_b);
        if b > debut_b && b < cs.len() && cs[b] == '/' {
            let c = chiffres_depuis(cs, b + 1);
            if c > b + 1 {
                return (TypeJeton::FractionMixte, c);
            }
        }
        if cs[j] == '_' {
            // forme incomplète : le jeton échouera à sa vérification
            return (TypeJeton::FractionMixte, b);
        }
    }

    let mut genre = TypeJeton::Entier;
    if j < cs.len() && cs[j] == '.' {
        genre = TypeJeton::DecimalFini;
        j = chiffres_depuis(cs, j + 1);
        let points = j;
        while j < cs.len() && cs[j] == '.' {
            j += 1;
        }
        if j > points {
            genre = TypeJeton::DecimalInfini;
        } else if j < cs.len() && cs[j] == ':' {
            genre = TypeJeton::DecimalInfini;
            j = chiffres_depuis(cs, j + 1);
        }
    }

    if matches!(genre, TypeJeton::Entier | TypeJeton::DecimalFini)
        && j < cs.len()
        && cs[j] == '%'
        && suivi_de_pourcentage(cs, j + 1)
    {
        genre = TypeJeton::Pourcentage;
        j += 1;
    }
    (genre, j)
}

/// Paramètre d’irrationnel en `i` : `?` seul, ou `[signe][nombre]?` juste après
/// un irrationnel ou une parenthèse fermante.
fn parametre_a(cs: &[char], i: usize, precedent: Option<&Jeton>) -> Option<usize> {
    if cs[i] == '?' {
        return Some(i + 1);
    }
    let attache = precedent
        .is_some_and(|p| p.est_irrationnel() || p.genre == TypeJeton::ParentheseDroite);
    if !attache {
        return None;
    }
    let mut j = i;
    if cs[j] == '+' || cs[j] == '-' {
        j += 1;
    }
    j = chiffres_depuis(cs, j);
    if j < cs.len() && cs[j] == '.' {
        j = chiffres_depuis(cs, j + 1);
    }
    (j < cs.len() && cs[j] == '?').then_some(j + 1)
}

fn fonction_a(cs: &[char], i: usize, noms: &[Vec<char>]) -> Option<usize> {
    noms.iter()
        .find(|n| {
            i + n.len() < cs.len()
                && cs[i..i + n.len()] == n[..]
                && "([{".contains(cs[i + n.len()])
        })
        .map(|n| n.len())
}

/// Découpe un texte normalisé en jetons (sans passes ni vérification de grammaire).
pub fn scanner(texte: &str, tables: &Tables) -> Result<FluxJetons, Erreur> {
    let cs: Vec<char> = texte.chars().collect();
    let mut noms: Vec<Vec<char>> = tables
        .noms_fonctions()
        .iter()
        .map(|n| n.chars().collect())
        .collect();
    noms.sort_by_key(|n| Reverse(n.len()));
    let reserves = tables.symboles_reserves();

    let mut jetons: Vec<Jeton> = Vec::new();
    let mut barres = 0usize;
    let mut i = 0usize;

    while i < cs.len() {
        let c = cs[i];
        let (genre, fin) = if c == '<' {
            match cs[i + 1..].iter().position(|&x| x == '>') {
                Some(k) => (TypeJeton::IrrationnelLong, i + k + 2),
                None => {
                    return Err(Erreur::new(
                        GenreErreur::Irrationnel {
                            forme: FormeIrrationnel::ChevronGauche,
                            contenu: "<".into(),
                        },
                        texte,
                        vec![Plage::point(i)],
                    ))
                }
            }
        } else if c == '>' {
            return Err(Erreur::new(
                GenreErreur::Irrationnel {
                    forme: FormeIrrationnel::ChevronDroit,
                    contenu: ">".into(),
                },
                texte,
                vec![Plage::point(i)],
            ));
        } else if let Some(fin) = parametre_a(&cs, i, jetons.last()) {
            (TypeJeton::ParametreIrrationnel, fin)
        } else if let Some(n) = fonction_a(&cs, i, &noms) {
            (TypeJeton::Fonction, i + n)
        } else if c.is_ascii_digit() {
            nombre_a(&cs, i, barres % 2 == 1)
        } else if "([{".contains(c) {
            (TypeJeton::ParentheseGauche, i + 1)
        } else if ")]}".contains(c) {
            (TypeJeton::ParentheseDroite, i + 1)
        } else if c == ',' || c == ';' {
            (TypeJeton::Separateur, i + 1)
        } else if IRRATIONNELS_NATIFS.contains(&c) {
            (TypeJeton::IrrationnelNatif, i + 1)
        } else if OPERATEURS.contains(&c) {
            if c == '|' {
                barres += 1;
            }
            (TypeJeton::Operateur, i + 1)
        } else if !caractere_reserve(c) && !reserves.contains(&c) {
            (TypeJeton::IrrationnelCourt, i + 1)
        } else {
            (TypeJeton::Inconnu, i + 1)
        };

        let valeur: String = cs[i..fin].iter().collect();
        jetons.push(Jeton::new(genre, valeur, i));
        i = fin;
    }

    Ok(FluxJetons::reconstruire(jetons))
}

/* ------------------------ Parenthèses ------------------------ */

fn priorite(c: char) -> u8 {
    match c {
        '(' | ')' => 1,
        '[' | ']' => 2,
        _ => 3,
    }
}

fn erreur_parenthese(flux: &FluxJetons, j: &Jeton, probleme: ProblemeParenthese) -> Erreur {
    Erreur::new(
        GenreErreur::Parenthese {
            probleme,
            parenthese: j.valeur.chars().next().unwrap_or('('),
        },
        &flux.texte,
        vec![j.plage],
    )
}

/// Imbrication : une ouvrante ne peut dépasser la priorité de l’ouvrante englobante.
pub fn verifier_parentheses(flux: &FluxJetons) -> Result<(), Erreur> {
    let mut pile: Vec<&Jeton> = Vec::new();
    for j in flux.iter() {
        match j.genre {
            TypeJeton::ParentheseGauche => {
                let p = priorite(j.valeur.chars().next().unwrap_or('('));
                if let Some(haut) = pile.last() {
                    if p > priorite(haut.valeur.chars().next().unwrap_or('(')) {
                        return Err(erreur_parenthese(flux, j, ProblemeParenthese::Hierarchie));
                    }
                }
                pile.push(j);
            }
            TypeJeton::ParentheseDroite => {
                let Some(ouvrante) = pile.pop() else {
                    return Err(erreur_parenthese(
                        flux,
                        j,
                        ProblemeParenthese::DroiteOrpheline,
                    ));
                };
                let po = priorite(ouvrante.valeur.chars().next().unwrap_or('('));
                let pf = priorite(j.valeur.chars().next().unwrap_or(')'));
                if po != pf {
                    return Err(erreur_parenthese(
                        flux,
                        ouvrante,
                        ProblemeParenthese::GaucheOrpheline,
                    ));
                }
            }
            _ => {}
        }
    }
    match pile.pop() {
        Some(ouvrante) => Err(erreur_parenthese(
            flux,
            ouvrante,
            ProblemeParenthese::GaucheOrpheline,
        )),
        None => Ok(()),
    }
}

fn unifier_parentheses(jetons: Vec<Jeton>) -> Vec<Jeton> {
    jetons
        .into_iter()
        .map(|mut j| {
            match j.genre {
                TypeJeton::ParentheseGauche => j.valeur = "(".into(),
                TypeJeton::ParentheseDroite => j.valeur = ")".into(),
                _ => {}
            }
            j
        })
        .collect()
}

/* ------------------------ Multiplication élidée ------------------------ */

fn multiplications_implicites(jetons: Vec<Jeton>) -> Vec<Jeton> {
    let mut out: Vec<Jeton> = Vec::with_capacity(jetons.len() * 2);
    let mut barres = 0usize;
    let mut fermante_precedente = false;

    for j in jetons {
        let barre = j.est_operateur('|');
        let ouvrante = barre && barres % 2 == 0;

        if let Some(prec) = out.last() {
            let fin_valeur = prec.termine_valeur() || fermante_precedente;
            if fin_valeur && (j.commence_valeur() || ouvrante) {
                out.push(Jeton::synthetique(
                    TypeJeton::Operateur,
                    "*",
                    Origine::MultiplicationImplicite,
                ));
            }
        }

        if barre {
            barres += 1;
        }
        fermante_precedente = barre && !ouvrante;
        out.push(j);
    }
    out
}

/* ------------------------ Fractionnement ------------------------ */

fn entier(s: &str) -> BigInt {
    BigInt::parse_bytes(s.as_bytes(), 10).unwrap_or_default()
}

fn puissance_dix(n: usize) -> BigInt {
    num_traits::pow(BigInt::from(10u32), n)
}

/// Plus courte période des décimales d’un décimal à points : plus petite
/// période `p`, puis plus petit départ `s`, tels que les chiffres depuis `s`
/// soient `p`-périodiques sur au moins deux périodes pleines. À défaut, toute
/// la partie décimale se répète. Renvoie `(s, p)`.
pub fn periode_la_plus_courte(f: &[u8]) -> (usize, usize) {
    let n = f.len();
    for p in 1..=n / 2 {
        for s in 0..=n - 2 * p {
            if (s..n - p).all(|k| f[k] == f[k + p]) {
                return (s, p);
            }
        }
    }
    (0, n)
}

/// `I.N(R)` avec `|N| = s`, `|R| = p` : ((I·10^s + N)(10^p − 1) + R) / (10^s (10^p − 1)).
fn decimal_periodique(i: &str, n: &str, r: &str) -> BigRational {
    let dix_s = puissance_dix(n.len());
    let neufs = puissance_dix(r.len()) - BigInt::one();
    let tete = entier(i) * &dix_s + entier(n);
    BigRational::new(tete * &neufs + entier(r), dix_s * neufs)
}

/// Valeur exacte d’un littéral numérique (None si invalide ou dénominateur nul).
pub fn rationnel_litteral(j: &Jeton) -> Option<BigRational> {
    let v = j.valeur.as_str();
    match j.genre {
        TypeJeton::Entier => BigInt::parse_bytes(v.as_bytes(), 10).map(BigRational::from_integer),
        TypeJeton::DecimalFini => {
            let (d, f) = v.split_once('.')?;
            Some(BigRational::new(
                entier(d) * puissance_dix(f.len()) + entier(f),
                puissance_dix(f.len()),
            ))
        }
        TypeJeton::DecimalInfini => {
            if let Some((tete, r)) = v.split_once(':') {
                let (d, f) = tete.split_once('.')?;
                return Some(decimal_periodique(d, f, r));
            }
            let (d, f) = v.trim_end_matches('.').split_once('.')?;
            if f.is_empty() {
                return None;
            }
            let (s, p) = periode_la_plus_courte(f.as_bytes());
            Some(decimal_periodique(d, &f[..s], &f[s..s + p]))
        }
        TypeJeton::Pourcentage => {
            let base = v.strip_suffix('%')?;
            let sous = Jeton::new(
                if base.contains('.') {
                    TypeJeton::DecimalFini
                } else {
                    TypeJeton::Entier
                },
                base,
                0,
            );
            rationnel_litteral(&sous).map(|r| r / BigRational::from_integer(BigInt::from(100)))
        }
        TypeJeton::FractionMixte => {
            // a + signe(b)·|b|/c
            let (a, reste) = v.split_once(['_', '|'])?;
            let (b, c) = reste.split_once('/')?;
            let c = entier(c);
            if c.is_zero() {
                return None;
            }
            let b = match b.strip_prefix('-') {
                Some(abs) => -entier(abs),
                None => entier(b.strip_prefix('+').unwrap_or(b)),
            };
            Some(BigRational::from_integer(entier(a)) + BigRational::new(b, c))
        }
        _ => None,
    }
}

/// Fraction mixte de dénominateur nul : division par zéro dès le lexique.
fn verifier_fractions_mixtes(flux: &FluxJetons) -> Result<(), Erreur> {
    for j in flux.iter() {
        if j.genre == TypeJeton::FractionMixte && rationnel_litteral(j).is_none() {
            return Err(Erreur::new(
                GenreErreur::DivisionParZero {
                    unite: j.valeur.clone(),
                },
                &flux.texte,
                vec![j.plage],
            ));
        }
    }
    Ok(())
}

/// Jetons `[-] Entier [/ Entier]` d’une fraction irréductible (le signe
/// n’apparaît que pour une fraction mixte négative, `0_-1/2`).
pub fn jetons_de_fraction(r: &BigRational) -> Vec<Jeton> {
    let mut out = Vec::with_capacity(4);
    if r.is_negative() {
        out.push(Jeton::new(TypeJeton::Operateur, "-", 0));
    }
    out.push(Jeton::new(TypeJeton::Entier, r.numer().abs().to_string(), 0));
    if !r.denom().is_one() {
        out.push(Jeton::synthetique(
            TypeJeton::Operateur,
            "/",
            Origine::BarreFraction,
        ));
        out.push(Jeton::new(TypeJeton::Entier, r.denom().to_string(), 0));
    }
    out
}

fn fractionner(jetons: Vec<Jeton>) -> Vec<Jeton> {
    let mut out = Vec::with_capacity(jetons.len());
    for j in jetons {
        let convertible = matches!(
            j.genre,
            TypeJeton::DecimalFini
                | TypeJeton::DecimalInfini
                | TypeJeton::Pourcentage
                | TypeJeton::FractionMixte
        );
        match (convertible, rationnel_litteral(&j)) {
            (true, Some(r)) => out.extend(jetons_de_fraction(&r)),
            _ => out.push(j),
        }
    }
    out
}

/* ------------------------ Pipeline ------------------------ */

/// Texte normalisé -> flux vérifié, parenthèses unifiées, multiplications
/// explicitées, littéraux fractionnés.
pub fn tokenize(texte: &str, tables: &Tables) -> Result<FluxJetons, Erreur> {
    let flux = scanner(texte, tables)?;
    trace!("balayage : {}", format_jetons(&flux.jetons));

    flux.verifier()?;
    verifier_parentheses(&flux)?;
    verifier_fractions_mixtes(&flux)?;

    let jetons = unifier_parentheses(flux.jetons);
    let flux = FluxJetons::reconstruire(multiplications_implicites(jetons));
    let flux = FluxJetons::reconstruire(fractionner(flux.jetons));

    trace!("flux : {}", format_jetons(&flux.jetons));
    Ok(flux)
}

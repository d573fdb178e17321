// src/noyau/format.rs
//
// Affichage EXACT canonique
// -------------------------
// - valeurs : p√n/q, kπ/d, 1/2y, x^2+2x+1, √(x+1), sin(1)...
// - arbre partiellement réduit (entrées de la démarche)
//
// Toute chaîne produite se relit avec le même sens : les parenthèses sont
// posées d’après les priorités de l’analyse syntaxique.

use std::fmt;

use num_rational::BigRational;
use num_traits::{One, Signed};

use super::arbre::{Forme, Litteral, Noeud, OpBinaire, OpUnaire};
use super::fonctions::Fonction;
use super::terme::{Facteur, Monome, Valeur};

/* ------------------------ Priorités ------------------------ */

const SOMME: u8 = 1;
const PRODUIT: u8 = 2;
const IMPLICITE: u8 = 3;
const PUISSANCE: u8 = 4;
const UNAIRE: u8 = 5;
const ATOME: u8 = 6;

fn entourer((s, prio): (String, u8), minimum: u8) -> String {
    if prio < minimum {
        format!("({s})")
    } else {
        s
    }
}

/// Deux morceaux juxtaposés se relieraient mal (`2` `3`, `a` `sin(1)`).
fn collision(gauche: &str, droite: &str) -> bool {
    let (Some(g), Some(d)) = (gauche.chars().last(), droite.chars().next()) else {
        return false;
    };
    if g.is_ascii_digit() && d.is_ascii_digit() {
        return true;
    }
    if g.is_alphabetic() && d.is_alphabetic() {
        let nom: String = droite.chars().take_while(|c| c.is_alphabetic()).collect();
        return droite[nom.len()..].starts_with('(');
    }
    false
}

fn juxtaposer(parts: &[String]) -> String {
    let mut out = String::new();
    for p in parts {
        if collision(&out, p) {
            out.push('(');
            out.push_str(p);
            out.push(')');
        } else {
            out.push_str(p);
        }
    }
    out
}

/* ------------------------ Helpers rationnels ------------------------ */

fn format_rat_pretty(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/* ------------------------ Valeurs ------------------------ */

fn format_appel(f: Fonction, args: &[Valeur]) -> String {
    if let (Fonction::Sqrt, [a]) = (f, args) {
        return format!("√({})", format_valeur(a));
    }
    let args: Vec<String> = args.iter().map(format_valeur).collect();
    format!("{}({})", f.nom(), args.join(","))
}

/// Facteur élevé à e > 0 ; priorité de la forme obtenue.
fn format_facteur(f: &Facteur, e: i64) -> (String, u8) {
    let (base, prio) = match f {
        Facteur::Racine(n) => (format!("√{n}"), UNAIRE),
        Facteur::Symbole(s) => (s.to_string(), ATOME),
        Facteur::Groupe(v) => (format!("({})", format_valeur(v)), ATOME),
        Facteur::Appel(Fonction::Sqrt, args) => (format_appel(Fonction::Sqrt, args), UNAIRE),
        Facteur::Appel(fx, args) => (format_appel(*fx, args), ATOME),
    };
    if e == 1 {
        (base, prio)
    } else {
        (format!("{base}^{e}"), PUISSANCE)
    }
}

/// c·m -> (texte, priorité)
fn format_terme(m: &Monome, c: &BigRational) -> (String, u8) {
    let negatif = c.is_negative();
    let c = c.abs();

    let facteurs_num: Vec<(String, u8)> = m
        .facteurs()
        .filter(|(_, e)| **e > 0)
        .map(|(f, e)| format_facteur(f, *e))
        .collect();
    let facteurs_den: Vec<(String, u8)> = m
        .facteurs()
        .filter(|(_, e)| **e < 0)
        .map(|(f, e)| format_facteur(f, -e))
        .collect();

    let mut num: Vec<String> = Vec::new();
    if !c.numer().is_one() || facteurs_num.is_empty() {
        num.push(c.numer().to_string());
    }
    let prio_num = match (num.len(), facteurs_num.as_slice()) {
        (0, [(_, p)]) => *p,
        (1, []) => ATOME,
        _ => IMPLICITE,
    };
    num.extend(facteurs_num.into_iter().map(|(s, _)| s));

    let mut den: Vec<String> = Vec::new();
    if !c.denom().is_one() {
        den.push(c.denom().to_string());
    }
    den.extend(facteurs_den.into_iter().map(|(s, _)| s));

    let mut texte = juxtaposer(&num);
    let mut prio = prio_num;
    if !den.is_empty() {
        texte = format!("{texte}/{}", juxtaposer(&den));
        prio = PRODUIT;
    }
    if negatif {
        texte.insert(0, '-');
        prio = SOMME;
    }
    (texte, prio)
}

pub fn format_valeur_prio(v: &Valeur) -> (String, u8) {
    if v.est_zero() {
        return ("0".to_string(), ATOME);
    }
    if let Some((m, c)) = v.terme_unique() {
        return format_terme(m, c);
    }
    // degrés décroissants, x avant y, constante en dernier
    let mut out = String::new();
    for (i, (m, c)) in v.termes_gradues().into_iter().enumerate() {
        let (t, _) = format_terme(m, c);
        if i > 0 && !t.starts_with('-') {
            out.push('+');
        }
        out.push_str(&t);
    }
    (out, SOMME)
}

pub fn format_valeur(v: &Valeur) -> String {
    format_valeur_prio(v).0
}

impl fmt::Display for Valeur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_valeur(self))
    }
}

/* ------------------------ Arbre (démarche) ------------------------ */

fn rendre_prio(n: &Noeud) -> (String, u8) {
    match n {
        Noeud::Litteral { litteral, .. } => match litteral {
            Litteral::Fraction(r) => {
                let prio = if r.denom().is_one() { ATOME } else { PRODUIT };
                (format_rat_pretty(r), prio)
            }
            Litteral::Irrationnel { .. } => (litteral.to_string(), ATOME),
        },
        Noeud::Valeur { valeur, .. } => format_valeur_prio(valeur),
        Noeud::Groupe {
            contenu, parametre, ..
        } => match parametre {
            Some(p) => (format!("({}){}", rendre(contenu), p.texte), ATOME),
            None => rendre_prio(contenu),
        },
        Noeud::Unaire { op, operande, .. } => match op {
            OpUnaire::Racine => (format!("√{}", entourer(rendre_prio(operande), UNAIRE)), UNAIRE),
            OpUnaire::Factorielle => (format!("{}!", entourer(rendre_prio(operande), ATOME)), UNAIRE),
            OpUnaire::Degre => (format!("{}°", entourer(rendre_prio(operande), ATOME)), UNAIRE),
            OpUnaire::Absolu => (format!("|{}|", rendre(operande)), ATOME),
        },
        Noeud::Binaire {
            op,
            forme,
            gauche,
            droite,
            ..
        } => lier(*op, *forme, rendre_prio(gauche), rendre_prio(droite)),
        Noeud::Chaine { tete, suite, .. } => suite
            .iter()
            .fold(rendre_prio(tete), |g, m| {
                lier(m.op, m.forme, g, rendre_prio(&m.noeud))
            }),
        Noeud::Appel { fonction, args, .. } => {
            let args: Vec<String> = args.iter().map(rendre).collect();
            (format!("{}({})", fonction.nom(), args.join(",")), ATOME)
        }
    }
}

/// `gauche op droite` ; le texte de gauche est prolongé sur place.
fn lier(op: OpBinaire, forme: Forme, gauche: (String, u8), droite: (String, u8)) -> (String, u8) {
    match forme {
        Forme::Signe => (
            format!("{}{}", op.symbole(), entourer(droite, PRODUIT)),
            SOMME,
        ),
        Forme::Juxtaposition => {
            let mut s = entourer(gauche, IMPLICITE);
            let d = entourer(droite, IMPLICITE + 1);
            if collision(&s, &d) {
                s.push('(');
                s.push_str(&d);
                s.push(')');
            } else {
                s.push_str(&d);
            }
            (s, IMPLICITE)
        }
        Forme::Explicite => {
            let prio = match op {
                OpBinaire::Plus | OpBinaire::Moins => SOMME,
                OpBinaire::Fois | OpBinaire::Divise => PRODUIT,
                OpBinaire::Puissance | OpBinaire::Modulo => PUISSANCE,
            };
            let mut s = entourer(gauche, prio);
            s.push(op.symbole());
            s.push_str(&entourer(droite, prio + 1));
            (s, prio)
        }
    }
}

/// Rendu d’un arbre (partiellement réduit) sous forme relisible.
pub fn rendre(n: &Noeud) -> String {
    rendre_prio(n).0
}

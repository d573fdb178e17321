// src/noyau/terme.rs
//
// Valeurs exactes symboliques
// ---------------------------
// Une `Valeur` est une somme finie de termes `coefficient · monôme`, le monôme
// étant un produit de facteurs élevés à des puissances entières non nulles :
// - `Racine(n)` : √n, n entier > 1 sans facteur carré (exposant toujours 1)
// - `Symbole`   : π, 𝑒, irrationnels personnalisés courts ou longs
// - `Groupe`    : somme irréductible gardée telle quelle (ex. 1/(x+1))
// - `Appel`     : fonction non réductible exactement (ex. sin(1), ln(2))
//
// Invariants :
// - aucun coefficient nul n’est stocké (la valeur nulle est la somme vide)
// - chaque monôme est canonique (cf. canon::normaliser)
// - l’ordre de stockage est celui de `Ord` sur les monômes : déterministe ;
//   l’affichage et la division suivent l’ordre gradué (degré, puis x avant y)

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::canon::{normaliser, puissance_rat, racine_de_rationnel};
use super::fonctions::{Fonction, DEVELOPPEMENT_MAX};

/// Étapes au plus de la division exacte entre deux sommes.
const DIVISION_MAX: usize = 256;

/* ------------------------ Symboles ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbole {
    Pi,
    E,
    /// Lettre isolée (`x`, `y`...).
    Court(char),
    /// Nom entre chevrons, sans les chevrons.
    Long(String),
}

impl Symbole {
    pub fn est_natif(&self) -> bool {
        matches!(self, Symbole::Pi | Symbole::E)
    }

    /// Lecture d’un jeton irrationnel (`π`, `𝑒`, `x`, `<nom>`).
    pub fn depuis_texte(texte: &str) -> Option<Self> {
        match texte {
            "π" => return Some(Symbole::Pi),
            "𝑒" => return Some(Symbole::E),
            _ => {}
        }
        if let Some(nom) = texte.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Some(Symbole::Long(nom.to_string()));
        }
        let mut cs = texte.chars();
        match (cs.next(), cs.next()) {
            (Some(c), None) => Some(Symbole::Court(c)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Symbole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbole::Pi => write!(f, "π"),
            Symbole::E => write!(f, "𝑒"),
            Symbole::Court(c) => write!(f, "{c}"),
            Symbole::Long(nom) => write!(f, "<{nom}>"),
        }
    }
}

/* ------------------------ Facteurs et monômes ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Facteur {
    Racine(BigInt),
    Symbole(Symbole),
    Groupe(Box<Valeur>),
    Appel(Fonction, Vec<Valeur>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Monome(BTreeMap<Facteur, i64>);

impl Monome {
    pub fn new(facteurs: BTreeMap<Facteur, i64>) -> Self {
        Self(facteurs)
    }

    pub fn est_vide(&self) -> bool {
        self.0.is_empty()
    }

    pub fn facteurs(&self) -> impl Iterator<Item = (&Facteur, &i64)> {
        self.0.iter()
    }

    pub fn nb_facteurs(&self) -> usize {
        self.0.len()
    }

    pub fn exposant(&self, f: &Facteur) -> i64 {
        self.0.get(f).copied().unwrap_or(0)
    }

    /// Plus grand exposant en valeur absolue (0 pour le monôme vide).
    pub fn exposant_max(&self) -> i64 {
        self.0.values().map(|e| e.abs()).max().unwrap_or(0)
    }

    pub fn degre(&self) -> i64 {
        self.0.values().sum()
    }

    /// Ordre gradué : degré total, puis exposant le plus fort sur le premier
    /// facteur où les monômes diffèrent (`x^2 > xy > y^2 > x > 1`).
    pub fn cmp_gradue(&self, autre: &Monome) -> Ordering {
        self.degre().cmp(&autre.degre()).then_with(|| {
            let facteurs: BTreeSet<&Facteur> = self.0.keys().chain(autre.0.keys()).collect();
            facteurs
                .into_iter()
                .map(|f| self.exposant(f).cmp(&autre.exposant(f)))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

/* ------------------------ Valeur ------------------------ */

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Valeur {
    termes: BTreeMap<Monome, BigRational>,
}

impl Valeur {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn un() -> Self {
        Self::rationnel(BigRational::one())
    }

    pub fn entier(n: i64) -> Self {
        Self::rationnel(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn rationnel(r: BigRational) -> Self {
        let mut v = Self::zero();
        v.accumuler(Monome::default(), r);
        v
    }

    pub fn symbole(s: Symbole) -> Self {
        Self::terme(BigRational::one(), [(Facteur::Symbole(s), 1)])
    }

    /// √r exact pour un rationnel r ≥ 0.
    pub fn racine(r: &BigRational) -> Self {
        racine_de_rationnel(r)
    }

    pub fn appel(f: Fonction, args: Vec<Valeur>) -> Self {
        Self::terme(BigRational::one(), [(Facteur::Appel(f, args), 1)])
    }

    /// Terme unique normalisé : `coef · Π facteur^exposant`.
    pub fn terme(coef: BigRational, facteurs: impl IntoIterator<Item = (Facteur, i64)>) -> Self {
        let (c, m) = normaliser(coef, facteurs);
        let mut v = Self::zero();
        v.ajouter_terme(m, c);
        v
    }

    /// Ajoute un terme normalisé ; un groupe à exposant positif modéré (issu
    /// d’une racine élevée au carré, d’une simplification) est redéveloppé.
    fn ajouter_terme(&mut self, m: Monome, c: BigRational) {
        let groupe = m.facteurs().find_map(|(f, e)| match f {
            Facteur::Groupe(g) if (1..=DEVELOPPEMENT_MAX).contains(e) => {
                Some((f.clone(), g.as_ref().clone(), *e))
            }
            _ => None,
        });
        let Some((facteur, g, e)) = groupe else {
            self.accumuler(m, c);
            return;
        };
        let reste: Vec<(Facteur, i64)> = m
            .facteurs()
            .filter(|(f, _)| **f != facteur)
            .map(|(f, e)| (f.clone(), *e))
            .collect();
        let developpe = &Valeur::terme(c, reste) * &g.puissance_entiere(e);
        for (m, c) in developpe.termes {
            self.accumuler(m, c);
        }
    }

    fn accumuler(&mut self, m: Monome, c: BigRational) {
        if c.is_zero() {
            return;
        }
        let somme = match self.termes.remove(&m) {
            Some(ancien) => ancien + c,
            None => c,
        };
        if !somme.is_zero() {
            self.termes.insert(m, somme);
        }
    }

    /* --- lecture --- */

    pub fn est_zero(&self) -> bool {
        self.termes.is_empty()
    }

    pub fn nb_termes(&self) -> usize {
        self.termes.len()
    }

    pub fn termes(&self) -> impl DoubleEndedIterator<Item = (&Monome, &BigRational)> {
        self.termes.iter()
    }

    /// Termes du plus grand au plus petit (ordre gradué).
    pub fn termes_gradues(&self) -> Vec<(&Monome, &BigRational)> {
        let mut t: Vec<_> = self.termes.iter().collect();
        t.sort_by(|a, b| b.0.cmp_gradue(a.0));
        t
    }

    fn meneur(&self) -> Option<(&Monome, &BigRational)> {
        self.termes.iter().max_by(|a, b| a.0.cmp_gradue(b.0))
    }

    pub fn terme_unique(&self) -> Option<(&Monome, &BigRational)> {
        if self.termes.len() == 1 {
            self.termes.iter().next()
        } else {
            None
        }
    }

    /// Valeur rationnelle si la somme ne contient que le terme constant.
    pub fn en_rationnel(&self) -> Option<BigRational> {
        match self.termes.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .termes
                .get(&Monome::default())
                .cloned(),
            _ => None,
        }
    }

    pub fn est_rationnel(&self) -> bool {
        self.en_rationnel().is_some()
    }

    /// Facteur unique d’exposant 1 et de coefficient 1 (ex. `π`, `sin(1)`).
    pub fn facteur_seul(&self) -> Option<&Facteur> {
        let (m, c) = self.terme_unique()?;
        if !c.is_one() || m.nb_facteurs() != 1 {
            return None;
        }
        let (f, e) = m.facteurs().next()?;
        (*e == 1).then_some(f)
    }

    /// Coefficient de π si la valeur est `k·π` (k rationnel) ou zéro.
    pub fn multiple_de_pi(&self) -> Option<BigRational> {
        if self.est_zero() {
            return Some(BigRational::zero());
        }
        let (m, c) = self.terme_unique()?;
        let pi = Facteur::Symbole(Symbole::Pi);
        (m.nb_facteurs() == 1 && m.exposant(&pi) == 1).then(|| c.clone())
    }

    /// Symboles présents, y compris dans les groupes et arguments d’appels.
    pub fn symboles(&self) -> BTreeSet<Symbole> {
        let mut acc = BTreeSet::new();
        self.collecter_symboles(&mut acc);
        acc
    }

    fn collecter_symboles(&self, acc: &mut BTreeSet<Symbole>) {
        for (m, _) in self.termes() {
            for (f, _) in m.facteurs() {
                match f {
                    Facteur::Symbole(s) => {
                        acc.insert(s.clone());
                    }
                    Facteur::Groupe(v) => v.collecter_symboles(acc),
                    Facteur::Appel(_, args) => args.iter().for_each(|a| a.collecter_symboles(acc)),
                    Facteur::Racine(_) => {}
                }
            }
        }
    }

    pub fn contient_personnalise(&self) -> bool {
        self.symboles().iter().any(|s| !s.est_natif())
    }

    /* --- arithmétique --- */

    pub fn echelle(&self, k: &BigRational) -> Valeur {
        if k.is_zero() {
            return Valeur::zero();
        }
        Valeur {
            termes: self
                .termes
                .iter()
                .map(|(m, c)| (m.clone(), c * k))
                .collect(),
        }
    }

    /// Coefficient du dernier terme (ordre canonique) et valeur divisée par celui-ci.
    pub fn primitif(&self) -> (BigRational, Valeur) {
        match self.termes.iter().next_back() {
            Some((_, c)) if !c.is_one() => {
                let meneur = c.clone();
                let v = self.echelle(&(BigRational::one() / &meneur));
                (meneur, v)
            }
            _ => (BigRational::one(), self.clone()),
        }
    }

    /// `k` tel que `self = k · autre`, si la proportion existe.
    pub fn proportion(&self, autre: &Valeur) -> Option<BigRational> {
        if autre.est_zero() || self.nb_termes() != autre.nb_termes() {
            return None;
        }
        let mut k: Option<BigRational> = None;
        for ((ma, ca), (mb, cb)) in self.termes().zip(autre.termes()) {
            if ma != mb {
                return None;
            }
            let q = ca / cb;
            match &k {
                Some(k0) if *k0 != q => return None,
                _ => k = Some(q),
            }
        }
        k
    }

    fn produit_termes(a: (&Monome, &BigRational), b: (&Monome, &BigRational)) -> (BigRational, Monome) {
        let facteurs = a
            .0
            .facteurs()
            .chain(b.0.facteurs())
            .map(|(f, e)| (f.clone(), *e));
        normaliser(a.1 * b.1, facteurs)
    }

    /// Inverse exact ; `None` pour zéro.
    pub fn inverse(&self) -> Option<Valeur> {
        if self.est_zero() {
            return None;
        }
        if let Some((m, c)) = self.terme_unique() {
            let facteurs: Vec<(Facteur, i64)> = m.facteurs().map(|(f, e)| (f.clone(), -e)).collect();
            return Some(Valeur::terme(BigRational::one() / c, facteurs));
        }
        Some(Valeur::terme(
            BigRational::one(),
            [(Facteur::Groupe(Box::new(self.clone())), -1)],
        ))
    }

    /// Division sans reste par une somme : `q` tel que `self = q · diviseur`.
    /// Le reste est tenu exact à chaque étape ; `None` s’il ne s’annule pas.
    fn division_exacte(&self, diviseur: &Valeur) -> Option<Valeur> {
        let (md, cd) = diviseur.meneur()?;
        if md.facteurs().any(|(_, e)| *e < 0) {
            return None;
        }
        let mut reste = self.clone();
        let mut q = Valeur::zero();
        for _ in 0..DIVISION_MAX {
            let Some((mr, cr)) = reste.meneur() else {
                return Some(q);
            };
            if md.facteurs().any(|(f, e)| mr.exposant(f) < *e) {
                return None;
            }
            let facteurs: Vec<(Facteur, i64)> = mr
                .facteurs()
                .map(|(f, e)| (f.clone(), e - md.exposant(f)))
                .collect();
            let t = Valeur::terme(cr / cd, facteurs);
            reste = &reste - &(&t * diviseur);
            q = q + t;
        }
        None
    }

    /// Quotient exact ; `None` si le diviseur est nul.
    pub fn quotient(&self, diviseur: &Valeur) -> Option<Valeur> {
        if diviseur.est_zero() {
            return None;
        }
        if let Some(k) = self.proportion(diviseur) {
            return Some(Valeur::rationnel(k));
        }
        if diviseur.nb_termes() > 1 {
            // facteur commun entier : (x+y)^2/(x+y), (x+y)/(x+y)^2
            if let Some(q) = self.division_exacte(diviseur) {
                return Some(q);
            }
            if self.nb_termes() > 1 {
                if let Some(q) = diviseur.division_exacte(self) {
                    return q.inverse();
                }
            }
        }
        let inv = diviseur.inverse()?;
        Some(self * &inv)
    }

    /// Puissance entière. Zéro à une puissance négative donne zéro : l’appelant
    /// vérifie ce cas avant.
    pub fn puissance_entiere(&self, k: i64) -> Valeur {
        if k == 0 {
            return Valeur::un();
        }
        if self.est_zero() {
            return Valeur::zero();
        }
        if let Some((m, c)) = self.terme_unique() {
            let facteurs: Vec<(Facteur, i64)> = m
                .facteurs()
                .map(|(f, e)| (f.clone(), e.saturating_mul(k)))
                .collect();
            return Valeur::terme(puissance_rat(c, k), facteurs);
        }
        if k < 0 {
            return Valeur::terme(
                BigRational::one(),
                [(Facteur::Groupe(Box::new(self.clone())), k)],
            );
        }
        // développement par carrés successifs
        let mut e = k as u64;
        let mut acc = Valeur::un();
        let mut b = self.clone();
        while e > 0 {
            if (e & 1) == 1 {
                acc = &acc * &b;
            }
            e >>= 1;
            if e > 0 {
                b = &b * &b;
            }
        }
        acc
    }

    /// Remplace chaque symbole pour lequel `f` donne une valeur, puis recalcule.
    pub fn substituer(&self, f: &dyn Fn(&Symbole) -> Option<Valeur>) -> Valeur {
        let mut total = Valeur::zero();
        for (m, c) in self.termes() {
            let mut produit = Valeur::rationnel(c.clone());
            for (fac, e) in m.facteurs() {
                let base = match fac {
                    Facteur::Symbole(s) => match f(s) {
                        Some(v) => v,
                        None => Valeur::symbole(s.clone()),
                    },
                    Facteur::Groupe(v) => v.substituer(f),
                    Facteur::Appel(fx, args) => {
                        Valeur::appel(*fx, args.iter().map(|a| a.substituer(f)).collect())
                    }
                    Facteur::Racine(n) => {
                        Valeur::terme(BigRational::one(), [(Facteur::Racine(n.clone()), 1)])
                    }
                };
                produit = &produit * &base.puissance_entiere(*e);
            }
            total = total + produit;
        }
        total
    }

    /// Signe évident : celui de tous les termes quand ils sont de signe connu.
    /// `signe_symbole` renseigne les irrationnels personnalisés.
    pub fn signe_evident(&self, signe_symbole: &dyn Fn(&Symbole) -> Option<i8>) -> Option<i8> {
        if self.est_zero() {
            return Some(0);
        }
        let mut global: Option<i8> = None;
        for (m, c) in self.termes() {
            let mut s: i8 = if c.is_negative() { -1 } else { 1 };
            for (f, e) in m.facteurs() {
                if e % 2 == 0 {
                    continue;
                }
                let sf = match f {
                    Facteur::Racine(_) => 1,
                    Facteur::Symbole(Symbole::Pi | Symbole::E) => 1,
                    Facteur::Symbole(autre) => signe_symbole(autre)?,
                    Facteur::Groupe(v) => v.signe_evident(signe_symbole)?,
                    Facteur::Appel(fx, args) => fx.signe_evident(args, signe_symbole)?,
                };
                s *= sf;
            }
            match global {
                None => global = Some(s),
                Some(g) if g != s => return None,
                _ => {}
            }
        }
        global
    }
}

/* ------------------------ Opérateurs ------------------------ */

impl Add<&Valeur> for &Valeur {
    type Output = Valeur;
    fn add(self, rhs: &Valeur) -> Valeur {
        let mut out = self.clone();
        for (m, c) in rhs.termes() {
            out.accumuler(m.clone(), c.clone());
        }
        out
    }
}

impl Add for Valeur {
    type Output = Valeur;
    fn add(self, rhs: Valeur) -> Valeur {
        &self + &rhs
    }
}

impl Neg for &Valeur {
    type Output = Valeur;
    fn neg(self) -> Valeur {
        Valeur {
            termes: self.termes.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }
}

impl Neg for Valeur {
    type Output = Valeur;
    fn neg(self) -> Valeur {
        -&self
    }
}

impl Sub<&Valeur> for &Valeur {
    type Output = Valeur;
    fn sub(self, rhs: &Valeur) -> Valeur {
        self + &(-rhs)
    }
}

impl Sub for Valeur {
    type Output = Valeur;
    fn sub(self, rhs: Valeur) -> Valeur {
        &self - &rhs
    }
}

impl Mul<&Valeur> for &Valeur {
    type Output = Valeur;
    fn mul(self, rhs: &Valeur) -> Valeur {
        let mut out = Valeur::zero();
        for a in self.termes() {
            for b in rhs.termes() {
                let (c, m) = Valeur::produit_termes(a, b);
                out.ajouter_terme(m, c);
            }
        }
        out
    }
}

impl Mul for Valeur {
    type Output = Valeur;
    fn mul(self, rhs: Valeur) -> Valeur {
        &self * &rhs
    }
}

impl From<BigRational> for Valeur {
    fn from(r: BigRational) -> Self {
        Valeur::rationnel(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn x() -> Valeur {
        Valeur::symbole(Symbole::Court('x'))
    }

    #[test]
    fn somme_et_annulation() {
        let a = &x() + &Valeur::un();
        let b = &a - &x();
        assert_eq!(b, Valeur::un());
        assert!((&x() - &x()).est_zero());
    }

    #[test]
    fn produit_de_racines() {
        let r2 = Valeur::racine(&q(2, 1));
        assert_eq!(&r2 * &r2, Valeur::entier(2));
        let r8 = Valeur::racine(&q(8, 1));
        assert_eq!(r8, &Valeur::entier(2) * &r2);
    }

    #[test]
    fn quotient_symbolique() {
        // 3x / 6xy = 1/(2y)
        let y = Valeur::symbole(Symbole::Court('y'));
        let num = &Valeur::entier(3) * &x();
        let den = &(&Valeur::entier(6) * &x()) * &y;
        let r = num.quotient(&den).unwrap();
        let attendu = Valeur::terme(q(1, 2), [(Facteur::Symbole(Symbole::Court('y')), -1)]);
        assert_eq!(r, attendu);
        assert!(Valeur::un().quotient(&Valeur::zero()).is_none());
    }

    #[test]
    fn quotient_par_une_somme() {
        let s = &x() + &Valeur::un();
        let double = s.echelle(&q(2, 1));
        assert_eq!(double.quotient(&s).unwrap(), Valeur::entier(2));
        let inv = Valeur::un().quotient(&double).unwrap();
        // 1/(2x+2) = (1/2)·(x+1)^-1
        let (m, c) = inv.terme_unique().unwrap();
        assert_eq!(c, &q(1, 2));
        assert_eq!(m.exposant(&Facteur::Groupe(Box::new(s))), -1);
    }

    #[test]
    fn quotient_par_facteur_commun() {
        let y = Valeur::symbole(Symbole::Court('y'));
        let s = &x() + &y;
        let carre = s.puissance_entiere(2);
        assert_eq!(carre.quotient(&s).unwrap(), s);
        // (x+y)/(x+y)^2 = 1/(x+y)
        let inv = s.quotient(&carre).unwrap();
        assert_eq!(inv, Valeur::un().quotient(&s).unwrap());
        // (x^2-1)/(x-1) = x+1
        let diff = &x().puissance_entiere(2) - &Valeur::un();
        let moins = &x() - &Valeur::un();
        assert_eq!(diff.quotient(&moins).unwrap(), &x() + &Valeur::un());
        // sans facteur commun : le quotient reste un produit par l’inverse
        let r = x().quotient(&(&x() + &Valeur::un())).unwrap();
        assert_eq!(r.nb_termes(), 1);
    }

    #[test]
    fn ordre_gradue() {
        let y = Valeur::symbole(Symbole::Court('y'));
        let carre = (&x() + &y).puissance_entiere(2);
        let degres: Vec<i64> = carre.termes_gradues().iter().map(|(m, _)| m.degre()).collect();
        assert_eq!(degres, vec![2, 2, 2]);
        let (premier, _) = carre.termes_gradues()[0];
        assert_eq!(premier.exposant(&Facteur::Symbole(Symbole::Court('x'))), 2);
        let m_x = x().terme_unique().map(|(m, _)| m.clone()).unwrap();
        assert_eq!(m_x.cmp_gradue(&Monome::default()), Ordering::Greater);
    }

    #[test]
    fn groupe_positif_redeveloppe() {
        let s = &x() + &Valeur::un();
        // (x+1)^2 · (x+1)^-1 = x+1, en somme
        let v = Valeur::terme(
            BigRational::one(),
            [
                (Facteur::Groupe(Box::new(s.clone())), 2),
                (Facteur::Groupe(Box::new(s.clone())), -1),
            ],
        );
        assert_eq!(v, s);
        assert!((&v - &s).est_zero());
    }

    #[test]
    fn developpement() {
        // (x+1)^2 = x^2 + 2x + 1
        let s = &x() + &Valeur::un();
        let carre = s.puissance_entiere(2);
        assert_eq!(carre.nb_termes(), 3);
        let attendu = &(&x().puissance_entiere(2) + &x().echelle(&q(2, 1))) + &Valeur::un();
        assert_eq!(carre, attendu);
    }

    #[test]
    fn substitution() {
        let v = &x() + &Valeur::entier(2);
        let r = v.substituer(&|s| (*s == Symbole::Court('x')).then(|| Valeur::rationnel(q(1, 2))));
        assert_eq!(r.en_rationnel(), Some(q(5, 2)));
    }

    #[test]
    fn signes_evidents() {
        let pi = Valeur::symbole(Symbole::Pi);
        assert_eq!((&pi + &Valeur::un()).signe_evident(&|_| None), Some(1));
        assert_eq!((-&pi).signe_evident(&|_| None), Some(-1));
        assert_eq!((&pi - &Valeur::un()).signe_evident(&|_| None), None);
        assert_eq!(x().signe_evident(&|_| Some(-1)), Some(-1));
    }

    #[test]
    fn lecture_des_symboles() {
        assert_eq!(Symbole::depuis_texte("π"), Some(Symbole::Pi));
        assert_eq!(Symbole::depuis_texte("<ab>"), Some(Symbole::Long("ab".into())));
        assert_eq!(Symbole::depuis_texte("x"), Some(Symbole::Court('x')));
        assert_eq!(Symbole::Long("ab".into()).to_string(), "<ab>");
    }
}
